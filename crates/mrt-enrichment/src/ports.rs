//! Collaborators the enrichment run depends on.

use async_trait::async_trait;
use mrt_core::{BandEnrichment, BandRecord, BandReference};
use uuid::Uuid;

use crate::error::EnrichmentError;

/// The primary store that owns band records.
#[async_trait]
pub trait BandStore: Send + Sync {
    async fn list_bands(&self) -> Result<Vec<BandRecord>, EnrichmentError>;

    /// Overwrites description, photo path and genre of band `id`.
    async fn update_band(
        &self,
        id: Uuid,
        enrichment: &BandEnrichment,
    ) -> Result<(), EnrichmentError>;
}

/// Read-only snapshot of the reference dataset.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn list_references(&self) -> Result<Vec<BandReference>, EnrichmentError>;
}

/// Object storage for band photos.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the stored path.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, EnrichmentError>;
}

/// The reference site.
#[async_trait]
pub trait BandPageSource: Send + Sync {
    /// HTML of the band page for reference id `external_id`.
    async fn band_page(&self, external_id: i64) -> Result<String, EnrichmentError>;

    /// Raw bytes of a photo linked from a band page.
    async fn photo(&self, url: &str) -> Result<Vec<u8>, EnrichmentError>;
}
