//! HTTP fetch capability.
//!
//! [`Fetch`] is the seam between the crawler and the network. [`HtmlClient`]
//! performs direct GETs; [`FlareSolverrClient`] routes requests through the
//! anti-bot proxy. Both classify failures into [`ScraperError`] variants so
//! the retry policy in [`crate::rate_limit`] can tell transient from fatal.

mod flaresolverr;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

pub use flaresolverr::FlareSolverrClient;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Retrieves page bodies and binary resources by URL.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// Returns a [`ScraperError`] for transport failures, timeouts and
    /// non-2xx responses.
    async fn fetch_text(&self, url: &str) -> Result<String, ScraperError>;

    /// Fetches `url` and returns the raw response body.
    ///
    /// # Errors
    ///
    /// Same as [`Fetch::fetch_text`].
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ScraperError>;
}

/// Direct HTTP client with a browser `User-Agent` and automatic retry of
/// transient failures.
pub struct HtmlClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl HtmlClient {
    /// Creates an `HtmlClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// `max_retries` is the number of additional attempts after the first
    /// failure for retriable errors. Set to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| ScraperError::from_request(url, e))?;
            check_status(url, response)
        })
        .await
    }
}

#[async_trait]
impl Fetch for HtmlClient {
    async fn fetch_text(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.get(url).await?;
        response
            .text()
            .await
            .map_err(|e| ScraperError::from_request(url, e))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        let response = self.get(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScraperError::from_request(url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Maps 429 to [`ScraperError::RateLimited`] and any other non-2xx status to
/// [`ScraperError::UnexpectedStatus`].
fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response, ScraperError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        return Err(ScraperError::RateLimited {
            url: url.to_owned(),
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(response)
}
