use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Encode a URL for use as the `u` query parameter.
pub fn encode_url(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}

/// Decode the `u` query parameter back into the original URL string.
///
/// Trailing `=` padding is tolerated so callers may use either the padded or
/// unpadded url-safe alphabet.
pub fn decode_url(param: &str) -> Option<String> {
    let trimmed = param.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(trimmed.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}
