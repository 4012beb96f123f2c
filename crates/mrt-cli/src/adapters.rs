//! Postgres-backed implementations of the scraper and enrichment ports.

use async_trait::async_trait;
use mrt_core::{BandEnrichment, BandRecord, BandReference, CatalogRecord};
use mrt_enrichment::{BandStore, EnrichmentError, ReferenceStore};
use mrt_scraper::{RecordSink, ScraperError};
use sqlx::PgPool;
use uuid::Uuid;

/// `"Bands"` in the primary store.
pub(crate) struct PgBandStore {
    pool: PgPool,
}

impl PgBandStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BandStore for PgBandStore {
    async fn list_bands(&self) -> Result<Vec<BandRecord>, EnrichmentError> {
        let rows = mrt_db::list_bands(&self.pool)
            .await
            .map_err(|e| EnrichmentError::Store(format!("listing bands: {e}")))?;
        Ok(rows.into_iter().map(BandRecord::from).collect())
    }

    async fn update_band(
        &self,
        id: Uuid,
        enrichment: &BandEnrichment,
    ) -> Result<(), EnrichmentError> {
        mrt_db::update_band_enrichment(&self.pool, id, enrichment)
            .await
            .map_err(|e| persist_error(id, &e))
    }
}

fn persist_error(id: Uuid, err: &mrt_db::DbError) -> EnrichmentError {
    let reason = match err {
        mrt_db::DbError::NotFound => "no band row with this id".to_string(),
        other => other.to_string(),
    };
    EnrichmentError::Persist {
        band: id.to_string(),
        reason,
    }
}

/// `"BandReferences"` in the catalog store.
pub(crate) struct PgReferenceStore {
    pool: PgPool,
}

impl PgReferenceStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceStore for PgReferenceStore {
    async fn list_references(&self) -> Result<Vec<BandReference>, EnrichmentError> {
        let rows = mrt_db::list_band_references(&self.pool)
            .await
            .map_err(|e| EnrichmentError::Store(format!("listing band references: {e}")))?;
        Ok(rows.into_iter().map(BandReference::from).collect())
    }
}

/// Upserts every crawled record into `catalog_records`.
pub(crate) struct PgCatalogSink {
    pool: PgPool,
    pub(crate) stored: usize,
}

impl PgCatalogSink {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool, stored: 0 }
    }
}

#[async_trait]
impl RecordSink for PgCatalogSink {
    async fn accept(&mut self, record: CatalogRecord) -> Result<(), ScraperError> {
        mrt_db::upsert_catalog_record(&self.pool, &record)
            .await
            .map_err(|e| ScraperError::Persist {
                url: record.source_url.clone(),
                reason: e.to_string(),
            })?;
        self.stored += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_band_row_is_reported_with_band_id() {
        let id = Uuid::nil();
        let err = persist_error(id, &mrt_db::DbError::NotFound);

        assert!(matches!(
            &err,
            EnrichmentError::Persist { band, reason }
                if band == "00000000-0000-0000-0000-000000000000" && reason.contains("no band row")
        ));
    }
}
