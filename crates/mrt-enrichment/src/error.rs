use mrt_scraper::ScraperError;
use thiserror::Error;

/// Failure enriching one band, or loading the run's inputs.
///
/// A band without a reference match is not an error; it is reported as
/// [`crate::BandOutcome::Skipped`].
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] ScraperError),

    #[error("upload of {key} failed: {reason}")]
    Upload { key: String, reason: String },

    #[error("failed to update band {band}: {reason}")]
    Persist { band: String, reason: String },

    #[error("store error: {0}")]
    Store(String),
}
