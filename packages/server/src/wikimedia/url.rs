use percent_encoding::percent_decode_str;
use url::Url;

/// Host serving original Wikimedia assets.
pub const UPLOAD_HOST: &str = "upload.wikimedia.org";

/// A recognized reference to a Wikimedia-hosted image.
///
/// Produced by [`parse`] from any of the syntactic forms a Wikimedia image
/// link takes in the wild: a direct (possibly thumbnailed) upload URL, a
/// `Special:FilePath` link, a `/wiki/<page>#/media/File:...` viewer link, or
/// a bare file-page link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikimediaImage {
    /// Direct URL under `upload.wikimedia.org`, possibly a thumbnail.
    Upload(Url),
    /// Known only by bare file name; the original URL must be looked up
    /// through the Commons API.
    File(String),
}

impl WikimediaImage {
    /// URL-decoded bare file name, without a `File:`/`ファイル:` prefix.
    pub fn file_name(&self) -> Option<String> {
        match self {
            WikimediaImage::File(name) => Some(name.clone()),
            WikimediaImage::Upload(url) => {
                let canonical = canonical_upload_url(url);
                let encoded = canonical.rsplit('/').next()?;
                decode(encoded)
            }
        }
    }
}

/// Classify an arbitrary string as a Wikimedia image reference.
///
/// Returns `None` for malformed URLs, non-http(s) schemes, non-Wikimedia
/// hosts, and Wikimedia page links that do not identify a file. Callers must
/// treat `None` as "no photo available", never as an error.
pub fn parse(input: &str) -> Option<WikimediaImage> {
    let url = Url::parse(input.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?;
    if host == UPLOAD_HOST {
        return Some(WikimediaImage::Upload(url));
    }
    if !is_wiki_host(host) {
        return None;
    }

    let path = decode(url.path())?;

    if let Some(rest) = path.strip_prefix("/wiki/Special:FilePath/") {
        let name = strip_file_prefix(rest);
        if name.is_empty() {
            return None;
        }
        return Some(WikimediaImage::File(name.to_string()));
    }

    // Viewer links: /wiki/<page>#/media/File:<name>
    if let Some(fragment) = url.fragment()
        && path.starts_with("/wiki/")
        && let Some(rest) = fragment.strip_prefix("/media/")
    {
        let decoded = decode(rest)?;
        let name = strip_file_prefix(&decoded);
        if name.is_empty() {
            return None;
        }
        return Some(WikimediaImage::File(name.to_string()));
    }

    // File-page links: /wiki/File:<name> or /wiki/ファイル:<name>
    if let Some(rest) = path.strip_prefix("/wiki/") {
        let name = strip_file_prefix(rest);
        if name != rest && !name.is_empty() {
            return Some(WikimediaImage::File(name.to_string()));
        }
    }

    None
}

/// Canonical original-asset URL for a direct upload URL.
///
/// Thumbnail URLs carry a `/thumb/` segment and a trailing `<size>-<name>`
/// segment: `/wikipedia/<project>/thumb/<h>/<hh>/<name>/<size>-<name>`.
/// Both are stripped, yielding `/wikipedia/<project>/<h>/<hh>/<name>`.
/// Already-canonical URLs pass through unchanged (query and fragment are
/// dropped either way).
pub fn canonical_upload_url(url: &Url) -> String {
    let mut segments: Vec<&str> = url.path().split('/').filter(|s| !s.is_empty()).collect();

    if let Some(pos) = segments.iter().position(|s| *s == "thumb")
        // The filename segment and at least one sizing segment must follow.
        && segments.len() > pos + 2
    {
        segments.remove(pos);
        segments.pop();
    }

    format!("https://{}/{}", UPLOAD_HOST, segments.join("/"))
}

fn is_wiki_host(host: &str) -> bool {
    for suffix in ["wikipedia.org", "wikimedia.org"] {
        if host == suffix || host.ends_with(&format!(".{suffix}")) {
            return true;
        }
    }
    false
}

fn strip_file_prefix(name: &str) -> &str {
    for prefix in ["File:", "ファイル:"] {
        if let Some(rest) = name.strip_prefix(prefix) {
            return rest;
        }
    }
    name
}

fn decode(s: &str) -> Option<String> {
    percent_decode_str(s)
        .decode_utf8()
        .ok()
        .map(|c| c.into_owned())
}
