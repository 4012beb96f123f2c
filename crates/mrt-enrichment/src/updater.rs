//! Enrichment run loop.
//!
//! Each band in the primary store moves through
//! `Pending -> Matched | Skipped -> Enriched | Failed`. Nothing is retried
//! within a run; a failed band is counted and left untouched.

use mrt_core::{BandEnrichment, BandRecord, BandReference};
use mrt_scraper::RequestDelay;
use uuid::Uuid;

use crate::band_page::parse_band_page;
use crate::error::EnrichmentError;
use crate::matcher::{build_lookup, resolve};
use crate::ports::{BandPageSource, BandStore, ContentStore, ReferenceStore};

pub const PHOTO_CONTENT_TYPE: &str = "image/jpeg";

/// Object key of a band's photo.
#[must_use]
pub fn photo_key(band_id: Uuid) -> String {
    format!("images/bands/{band_id}.jpg")
}

/// Terminal state of one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandOutcome {
    Skipped,
    Enriched,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl EnrichmentSummary {
    fn record(&mut self, outcome: BandOutcome) {
        match outcome {
            BandOutcome::Skipped => self.skipped += 1,
            BandOutcome::Enriched => self.updated += 1,
            BandOutcome::Failed => self.failed += 1,
        }
    }
}

/// Match counts without touching the network; see [`EnrichmentUpdater::preview`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    pub matched: usize,
    pub skipped: usize,
    pub duplicate_references: Vec<String>,
}

pub struct EnrichmentUpdater<'a> {
    bands: &'a dyn BandStore,
    references: &'a dyn ReferenceStore,
    pages: &'a dyn BandPageSource,
    content: &'a dyn ContentStore,
    delay: RequestDelay,
}

impl<'a> EnrichmentUpdater<'a> {
    pub fn new(
        bands: &'a dyn BandStore,
        references: &'a dyn ReferenceStore,
        pages: &'a dyn BandPageSource,
        content: &'a dyn ContentStore,
        delay: RequestDelay,
    ) -> Self {
        Self {
            bands,
            references,
            pages,
            content,
            delay,
        }
    }

    /// Enriches every band that has a reference match.
    ///
    /// # Errors
    ///
    /// Only loading the band list or the reference snapshot is fatal. Per-band
    /// failures are logged and counted in the summary.
    pub async fn run(&self) -> Result<EnrichmentSummary, EnrichmentError> {
        let bands = self.bands.list_bands().await?;
        let references = self.references.list_references().await?;
        tracing::info!(
            bands = bands.len(),
            references = references.len(),
            "starting band enrichment"
        );

        let lookup = build_lookup(references);
        for name in lookup.duplicates() {
            tracing::warn!(name = %name, "duplicate reference name; keeping the last entry");
        }

        let mut summary = EnrichmentSummary::default();
        let mut first = true;
        for band in &bands {
            let Some(reference) = resolve(&band.name, &lookup) else {
                tracing::warn!(band = %band.name, "no reference match, skipping");
                summary.record(BandOutcome::Skipped);
                continue;
            };

            if !std::mem::take(&mut first) {
                self.delay.wait().await;
            }

            let outcome = match self.enrich_band(band, reference).await {
                Ok(()) => {
                    tracing::info!(band = %band.name, "band enriched");
                    BandOutcome::Enriched
                }
                Err(e) => {
                    tracing::error!(band = %band.name, error = %e, "band enrichment failed");
                    BandOutcome::Failed
                }
            };
            summary.record(outcome);
        }

        tracing::info!(
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            "band enrichment finished"
        );
        Ok(summary)
    }

    /// Counts matches and skips without fetching or writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if either store cannot be read.
    pub async fn preview(&self) -> Result<MatchReport, EnrichmentError> {
        let bands = self.bands.list_bands().await?;
        let lookup = build_lookup(self.references.list_references().await?);
        let matched = bands
            .iter()
            .filter(|b| resolve(&b.name, &lookup).is_some())
            .count();
        Ok(MatchReport {
            matched,
            skipped: bands.len() - matched,
            duplicate_references: lookup.duplicates().to_vec(),
        })
    }

    async fn enrich_band(
        &self,
        band: &BandRecord,
        reference: &BandReference,
    ) -> Result<(), EnrichmentError> {
        tracing::debug!(band = %band.name, external_id = reference.external_id, "fetching band page");
        let html = self.pages.band_page(reference.external_id).await?;
        let page = parse_band_page(&html);

        let photo_path = match page.photo_url.as_deref() {
            Some(url) => {
                let bytes = self.pages.photo(url).await?;
                let path = self
                    .content
                    .put(&photo_key(band.id), bytes, PHOTO_CONTENT_TYPE)
                    .await?;
                Some(path)
            }
            None => None,
        };

        let enrichment = BandEnrichment {
            description: page.description,
            photo_path,
            genre: reference.genre.clone(),
        };
        self.bands.update_band(band.id, &enrichment).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_key_is_derived_from_band_id() {
        let id = Uuid::parse_str("6f1c2e4a-0b7d-4c8e-9a1f-2d3b4c5e6f70").unwrap();
        assert_eq!(
            photo_key(id),
            "images/bands/6f1c2e4a-0b7d-4c8e-9a1f-2d3b4c5e6f70.jpg"
        );
    }

    #[test]
    fn summary_counts_each_outcome() {
        let mut summary = EnrichmentSummary::default();
        for outcome in [
            BandOutcome::Enriched,
            BandOutcome::Skipped,
            BandOutcome::Enriched,
            BandOutcome::Failed,
        ] {
            summary.record(outcome);
        }
        assert_eq!(
            summary,
            EnrichmentSummary {
                updated: 2,
                skipped: 1,
                failed: 1
            }
        );
    }
}
