//! The fetch capability used by robots evaluation and page discovery.
//!
//! [`Fetcher`] is fail-soft: any failure is reported as an empty body. Both
//! callers rely on this. An empty robots file means "no policy" and an empty
//! page means "no feeds". [`HttpFetcher`] is the `reqwest` implementation. It
//! keeps a typed [`FetchError`] internally for logging and exposes it through
//! [`HttpFetcher::try_fetch`] for callers that want the reason.

use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RETRIES: u32 = 1;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024; // 5MB

/// Retrieves the text behind a URL.
///
/// Implementations must return the response body on success and an empty
/// string on any failure (network error, non-2xx status, timeout). They must
/// never panic or surface an error to the caller.
pub trait Fetcher {
    /// Fetches `url`, identifying as `user_agent`.
    fn fetch(&self, url: &str, user_agent: &str) -> impl Future<Output = String> + Send;
}

/// Errors that can occur during a single HTTP fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, invalid header, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

impl FetchError {
    /// Returns true if this error is transient and the request should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout
            | FetchError::Network(_)
            | FetchError::IncompleteResponse { .. } => true,
            FetchError::HttpStatus(status) => *status >= 500 || *status == 429,
            FetchError::ResponseTooLarge(_) => false,
        }
    }
}

/// HTTP implementation of [`Fetcher`] with a bounded timeout, a retry budget
/// for transient failures and a body size limit.
///
/// # Example
///
/// ```no_run
/// use feedscout::fetcher::{Fetcher, HttpFetcher};
/// use std::time::Duration;
///
/// # async fn run() {
/// let fetcher = HttpFetcher::new(reqwest::Client::new())
///     .with_timeout(Duration::from_secs(5))
///     .with_retries(1);
/// let body = fetcher.fetch("https://example.com/", "Googlebot").await;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    retries: u32,
    retry_delay: Duration,
    max_body_bytes: usize,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl HttpFetcher {
    /// Wraps a client (caller controls TLS, proxies, redirects) with default limits.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Per-attempt timeout covering both the request and the body read.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of extra attempts after a transient failure.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Fetches `url` and returns the body, or the error of the last attempt.
    ///
    /// Transient failures (see [`FetchError::is_retryable`]) are retried up to
    /// the configured budget with a fixed delay between attempts. Non-UTF-8
    /// bytes are replaced rather than rejected, since pages in legacy
    /// encodings still carry ASCII markup.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] - Connection or TLS errors
    /// - [`FetchError::Timeout`] - Attempt exceeded the timeout
    /// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
    /// - [`FetchError::ResponseTooLarge`] - Body exceeded the size limit
    /// - [`FetchError::IncompleteResponse`] - Body shorter than Content-Length
    pub async fn try_fetch(&self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        let mut retry_count = 0;

        loop {
            match self.fetch_once(url, user_agent).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && retry_count < self.retries => {
                    tracing::debug!(
                        url = %url,
                        error = %e,
                        retry = retry_count + 1,
                        delay_ms = self.retry_delay.as_millis() as u64,
                        "Retrying fetch after transient error"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    retry_count += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        let attempt = async {
            let response = self
                .client
                .get(url)
                .header(reqwest::header::USER_AGENT, user_agent)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(FetchError::HttpStatus(response.status().as_u16()));
            }

            let bytes = read_limited_bytes(response, self.max_body_bytes).await?;
            Ok::<_, FetchError>(String::from_utf8_lossy(&bytes).into_owned())
        };

        tokio::time::timeout(self.timeout, attempt)
            .await
            .map_err(|_| FetchError::Timeout)?
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, user_agent: &str) -> impl Future<Output = String> + Send {
        async move {
            match self.try_fetch(url, user_agent).await {
                Ok(body) => body,
                Err(FetchError::HttpStatus(status)) => {
                    tracing::debug!(
                        url = %url,
                        status = status,
                        "Non-success status, treating body as empty"
                    );
                    String::new()
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Fetch failed, treating body as empty");
                    String::new()
                }
            }
        }
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
