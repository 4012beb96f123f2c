//! `enrich-bands` command handler.

use mrt_core::AppConfig;
use mrt_enrichment::{EnrichmentUpdater, ReferenceSite, S3ContentStore, S3Settings};
use mrt_scraper::{FlareSolverrClient, HtmlClient, RequestDelay};

use crate::adapters::{PgBandStore, PgReferenceStore};

/// Enrich every band in the primary store that has a reference match.
///
/// With `dry_run` only the match preview runs: nothing is fetched, uploaded
/// or written, and content store credentials are not required.
///
/// # Errors
///
/// Returns an error if a required setting is missing, a database is
/// unreachable, or the band or reference list cannot be loaded. Per-band
/// failures are logged and counted.
pub(crate) async fn run_enrich_bands(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let core = mrt_db::connect_core(config).await?;
    let catalog = mrt_db::connect_catalog(config).await?;

    let bands = PgBandStore::new(core);
    let references = PgReferenceStore::new(catalog);

    let proxy = FlareSolverrClient::new(
        &config.flaresolverr_url,
        config.flaresolverr_max_timeout_ms,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_secs,
    )?;
    let direct = HtmlClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_secs,
    )?;
    let pages = ReferenceSite::new(&config.reference_site_base_url, proxy, direct);

    let (access_key, secret_key) = if dry_run {
        ("", "")
    } else {
        config.require_minio_credentials()?
    };
    let content = S3ContentStore::connect(
        S3Settings {
            endpoint: config.minio_endpoint.clone(),
            bucket: config.minio_bucket.clone(),
            region: config.minio_region.clone(),
            access_key: access_key.to_owned(),
            secret_key: secret_key.to_owned(),
        },
        config.scraper_request_timeout_secs,
    )
    .await;

    let delay = RequestDelay::from_millis(config.request_delay_min_ms, config.request_delay_max_ms);
    let updater = EnrichmentUpdater::new(&bands, &references, &pages, &content, delay);

    if dry_run {
        let report = updater.preview().await?;
        println!(
            "dry-run: {} bands would be enriched, {} have no reference match",
            report.matched, report.skipped
        );
        if !report.duplicate_references.is_empty() {
            println!(
                "duplicate reference names (last entry wins): {}",
                report.duplicate_references.join(", ")
            );
        }
        return Ok(());
    }

    let summary = updater.run().await?;
    println!(
        "bands updated: {}, skipped: {}, failed: {}",
        summary.updated, summary.skipped, summary.failed
    );
    Ok(())
}
