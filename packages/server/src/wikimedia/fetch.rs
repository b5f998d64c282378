use std::time::Duration;

use futures::StreamExt;

/// Failure modes of an upstream fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Bounded-retry policy for upstream requests.
///
/// Retries are limited to transport errors and server-class (5xx) statuses;
/// client errors and timeouts fail immediately. Delays grow exponentially
/// from `base_delay`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per request (1 = no retries).
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable_status(status: u16) -> bool {
        (500..=599).contains(&status)
    }

    /// Delay before the retry following the given 1-based attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Whether another attempt should follow the given failed 1-based attempt.
    pub fn should_retry(&self, attempt: u32, error: &FetchError) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        match error {
            FetchError::Status(status) => Self::is_retryable_status(*status),
            FetchError::Transport(_) => true,
            _ => false,
        }
    }
}

/// Issue a GET request under the given retry policy.
///
/// `request` builds a fresh request per attempt (request builders are
/// single-use). Non-2xx responses are returned as [`FetchError::Status`].
pub async fn get_with_retry(
    policy: &RetryPolicy,
    request: impl Fn() -> reqwest::RequestBuilder,
) -> Result<reqwest::Response, FetchError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;

        let outcome = match request().send().await {
            Ok(resp) if resp.status().is_success() => return Ok(resp),
            Ok(resp) => FetchError::Status(resp.status().as_u16()),
            Err(err) => FetchError::from(err),
        };

        if !policy.should_retry(attempt, &outcome) {
            return Err(outcome);
        }

        let delay = policy.delay_after(attempt);
        tracing::debug!(attempt, ?delay, error = %outcome, "retrying upstream request");
        tokio::time::sleep(delay).await;
    }
}

/// Read a response body, aborting once it would exceed `limit` bytes.
///
/// The declared `Content-Length` is checked up front; bodies without one (or
/// lying about it) are cut off mid-stream. A failed transfer never yields a
/// truncated buffer.
pub async fn read_bounded(resp: reqwest::Response, limit: usize) -> Result<Vec<u8>, FetchError> {
    if let Some(declared) = resp.content_length()
        && declared > limit as u64
    {
        return Err(FetchError::TooLarge { limit });
    }

    let mut body = Vec::new();
    let mut stream = resp.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::from)?;
        if body.len() + chunk.len() > limit {
            return Err(FetchError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Content type of a response, defaulting to `application/octet-stream`.
pub fn content_type(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string()
}
