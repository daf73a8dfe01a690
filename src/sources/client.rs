/// Blocking HTTP client shared by the catalog adapters.
///
/// Provides `CatalogClient` for fetching pages and JSON documents with timeouts
/// and bounded retries, along with the error type every adapter reports.
use std::thread;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Browser-like user agent; several storefronts serve stripped pages otherwise.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Errors that can occur while querying a catalog.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The page did not have the expected structure
    #[error("Unexpected page layout: {0}")]
    Parse(String),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl SourceError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }

    /// True for HTTP 404, which adapters treat as "no such application".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404 })
    }
}

/// Retry schedule for transient failures.
///
/// After the first attempt, up to `max_retries` further attempts are made,
/// sleeping `base_delay`, `2 * base_delay`, `4 * base_delay`, ... in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const NONE: RetryPolicy = RetryPolicy {
        max_retries: 0,
        base_delay: Duration::ZERO,
    };

    fn delay(&self, retry: usize) -> Duration {
        let factor = 1u32.checked_shl(retry as u32).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Builder for constructing `CatalogClient` instances.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use appenergy::sources::CatalogClientBuilder;
///
/// let client = CatalogClientBuilder::new()
///     .timeout(Duration::from_secs(10))
///     .build()
///     .expect("Failed to create client");
/// ```
#[derive(Debug, Default)]
pub struct CatalogClientBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    retry: Option<RetryPolicy>,
}

impl CatalogClientBuilder {
    /// Creates a new `CatalogClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total timeout of a single request (default 15s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout (default 5s).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Overrides the default browser-like user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the retry schedule for transient failures.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Builds the `CatalogClient` with the configured settings.
    pub fn build(self) -> Result<CatalogClient, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(15)))
            .connect_timeout(self.connect_timeout.unwrap_or(Duration::from_secs(5)))
            .user_agent(
                self.user_agent
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            )
            .build()
            .map_err(SourceError::Network)?;

        Ok(CatalogClient {
            client,
            retry: self.retry.unwrap_or_default(),
        })
    }
}

/// Synchronous HTTP client used by every catalog adapter.
///
/// It should be constructed using `CatalogClientBuilder`.
pub struct CatalogClient {
    client: reqwest::blocking::Client,
    retry: RetryPolicy,
}

impl CatalogClient {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// Non-success statuses become [`SourceError::Http`].
    pub fn get_text(&self, url: &Url, headers: &[(&str, &str)]) -> Result<String, SourceError> {
        retry_with_backoff(self.retry, || {
            debug!(%url, "GET");
            let mut request = self.client.get(url.clone());
            for (name, value) in headers {
                request = request.header(*name, *value);
            }

            let response = request.send().map_err(SourceError::from_reqwest)?;
            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::Http {
                    status: status.as_u16(),
                });
            }

            response.text().map_err(SourceError::from_reqwest)
        })
    }

    /// Like [`get_text`](Self::get_text), but a 404 yields `Ok(None)`.
    pub fn get_page(
        &self,
        url: &Url,
        headers: &[(&str, &str)],
    ) -> Result<Option<String>, SourceError> {
        match self.get_text(url, headers) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.is_not_found() => {
                debug!(%url, "not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Fetches `url` and deserializes the JSON body.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        headers: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let body = self.get_text(url, headers)?;
        serde_json::from_str(&body).map_err(SourceError::Serialization)
    }
}

/// Parses a URL, mapping failures to [`SourceError::InvalidUrl`].
pub(crate) fn parse_url(url: &str) -> Result<Url, SourceError> {
    Url::parse(url).map_err(|e| SourceError::InvalidUrl(format!("{url}: {e}")))
}

/// Returns `base` with `segment` appended as one percent-encoded path segment.
pub(crate) fn with_path_segment(base: &str, segment: &str) -> Result<Url, SourceError> {
    let mut url = parse_url(base)?;
    url.path_segments_mut()
        .map_err(|_| SourceError::InvalidUrl(format!("{base}: cannot be a base")))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

/// Retries an operation with exponential backoff.
///
/// Only transient errors (network errors, timeouts, HTTP 5xx) are retried;
/// client errors and parse failures are returned immediately.
pub fn retry_with_backoff<F, T>(policy: RetryPolicy, mut f: F) -> Result<T, SourceError>
where
    F: FnMut() -> Result<T, SourceError>,
{
    let mut last_error = match f() {
        Ok(result) => return Ok(result),
        Err(e) => {
            if !should_retry(&e) {
                return Err(e);
            }
            e
        }
    };

    for retry in 0..policy.max_retries {
        let delay = policy.delay(retry);
        debug!(retry = retry + 1, ?delay, error = %last_error, "retrying request");
        thread::sleep(delay);

        match f() {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !should_retry(&e) {
                    return Err(e);
                }
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// Determines if an error should be retried.
fn should_retry(error: &SourceError) -> bool {
    match error {
        SourceError::Network(_) => true,
        SourceError::Timeout(_) => true,
        SourceError::Http { status } => (500..600).contains(status),
        SourceError::Serialization(_) => false,
        SourceError::Parse(_) => false,
        SourceError::InvalidUrl(_) => false,
    }
}
