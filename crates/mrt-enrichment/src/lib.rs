pub mod band_page;
pub mod error;
pub mod matcher;
pub mod ports;
pub mod source;
pub mod storage;
pub mod updater;

pub use band_page::{parse_band_page, BandPage};
pub use error::EnrichmentError;
pub use matcher::{build_lookup, normalize_name, resolve, ReferenceLookup};
pub use ports::{BandPageSource, BandStore, ContentStore, ReferenceStore};
pub use source::ReferenceSite;
pub use storage::{S3ContentStore, S3Settings};
pub use updater::{
    photo_key, BandOutcome, EnrichmentSummary, EnrichmentUpdater, MatchReport, PHOTO_CONTENT_TYPE,
};
