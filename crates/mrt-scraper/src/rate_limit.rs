//! Retry and pacing utilities.
//!
//! Transient failures (network errors, timeouts, 429s and 5xx responses) are
//! retried with exponential backoff. Everything else (parse failures, 4xx,
//! proxy refusals) is propagated immediately. [`RequestDelay`] implements the
//! cooperative randomized pause inserted between sequential requests.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::ScraperError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. }
        | ScraperError::Transport(_)
        | ScraperError::Timeout { .. } => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Pause before retry number `attempt + 1`.
///
/// Exponential in `attempt`; a server-sent `Retry-After` raises the pause
/// but never shortens it.
fn retry_delay(attempt: u32, backoff_base_secs: u64, err: &ScraperError) -> Duration {
    let backoff = Duration::from_secs(backoff_base_secs.saturating_mul(1u64 << attempt.min(62)));
    match err {
        ScraperError::RateLimited {
            retry_after_secs: Some(secs),
            ..
        } => backoff.max(Duration::from_secs(*secs)),
        _ => backoff,
    }
}

/// Runs `operation`, retrying transient errors up to `max_retries` times.
///
/// | Attempt | Pause before it (`backoff_base_secs = 1`, no `Retry-After`) |
/// |---------|------------------------------------------------------|
/// | 0 (initial) | none |
/// | 1 (first retry) | 1 s |
/// | 2 (second retry) | 2 s |
/// | 3 (third retry) | 4 s |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) && attempt < max_retries => err,
            Err(err) => return Err(err),
        };

        let delay = retry_delay(attempt, backoff_base_secs, &err);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient fetch error, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Randomized pause between sequential requests, uniform in `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDelay {
    min: Duration,
    max: Duration,
}

impl RequestDelay {
    /// Bounds are swapped if given in the wrong order.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    #[must_use]
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    /// No pause at all; used by tests and dry runs.
    #[must_use]
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Draws the next pause length.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min_ms = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }

    pub async fn wait(&self) {
        let pause = self.sample();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
}
