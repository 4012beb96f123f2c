//! `sites`, `scrape` and `catalog` command handlers.
//!
//! A scrape walks one configured site and streams every extracted record
//! into a sink: the catalog database, or stdout as JSON lines for dry runs.

use std::io::Write;

use anyhow::Context;
use async_trait::async_trait;
use mrt_core::{AppConfig, CatalogRecord, SiteRules, Transport};
use mrt_scraper::{
    CrawlOptions, CrawlSummary, Crawler, Fetch, FlareSolverrClient, HtmlClient, RecordSink,
    RequestDelay, ScraperError,
};

use crate::adapters::PgCatalogSink;

/// Print one line per configured site.
///
/// # Errors
///
/// Returns an error if the sites file cannot be loaded.
pub(crate) fn run_sites(config: &AppConfig) -> anyhow::Result<()> {
    let sites = mrt_core::load_sites(&config.sites_path)?;
    for site in &sites.sites {
        println!(
            "{:<18} {:<20} {:<13} {} categories",
            site.id,
            site.name,
            transport_name(site.transport),
            site.categories.len()
        );
    }
    Ok(())
}

fn transport_name(transport: Transport) -> &'static str {
    match transport {
        Transport::Direct => "direct",
        Transport::Flaresolverr => "flaresolverr",
    }
}

/// Crawl `site_id` and store or print every extracted record.
///
/// `categories` restricts the crawl to the given listing URLs; when empty,
/// every configured category is walked in order.
///
/// # Errors
///
/// Returns an error if the site is unknown, its rules are malformed, the
/// database is unreachable, or no requested category could be crawled.
/// Individual item failures are logged and counted, not propagated.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    site_id: &str,
    categories: &[String],
    dry_run: bool,
) -> anyhow::Result<()> {
    let sites = mrt_core::load_sites(&config.sites_path)?;
    let site = sites.find(site_id).with_context(|| {
        format!(
            "site '{site_id}' not found in {}",
            config.sites_path.display()
        )
    })?;
    let urls = category_urls(site, categories);

    let fetch = build_fetcher(config, site.transport)?;
    let options = CrawlOptions {
        max_pages: config.scraper_max_pages,
        delay: RequestDelay::from_millis(config.request_delay_min_ms, config.request_delay_max_ms),
    };
    let crawler = Crawler::new(site, fetch.as_ref(), options)?;

    let summary = if dry_run {
        let mut sink = JsonLinesSink::new(std::io::stdout());
        crawler.crawl_categories(&urls, &mut sink).await
    } else {
        let pool = mrt_db::connect_catalog(config).await?;
        let mut sink = PgCatalogSink::new(pool);
        let summary = crawler.crawl_categories(&urls, &mut sink).await;
        tracing::info!(site = %site.id, stored = sink.stored, "catalog records upserted");
        summary
    };

    report(&site.id, &summary, urls.len())
}

/// Requested category URLs, or every configured one when none were given.
fn category_urls(site: &SiteRules, requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        return site.categories.iter().map(|c| c.url.clone()).collect();
    }
    for url in requested {
        if !site.categories.iter().any(|c| c.url.eq_ignore_ascii_case(url)) {
            tracing::warn!(site = %site.id, category = %url, "category is not configured; no media fallback");
        }
    }
    requested.to_vec()
}

fn build_fetcher(config: &AppConfig, transport: Transport) -> anyhow::Result<Box<dyn Fetch>> {
    let fetch: Box<dyn Fetch> = match transport {
        Transport::Direct => Box::new(HtmlClient::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )?),
        Transport::Flaresolverr => Box::new(FlareSolverrClient::new(
            &config.flaresolverr_url,
            config.flaresolverr_max_timeout_ms,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )?),
    };
    Ok(fetch)
}

fn report(site_id: &str, summary: &CrawlSummary, requested: usize) -> anyhow::Result<()> {
    eprintln!(
        "{site_id}: {} pages, {} listed, {} extracted, {} failed, {} categories aborted",
        summary.pages,
        summary.listed,
        summary.extracted,
        summary.failed,
        summary.aborted_categories.len()
    );
    for url in &summary.aborted_categories {
        eprintln!("  aborted: {url}");
    }
    if requested > 0 && summary.aborted_categories.len() == requested {
        anyhow::bail!("every category of site '{site_id}' was aborted");
    }
    Ok(())
}

/// Print up to `limit` stored records of `site_id`, newest first.
///
/// # Errors
///
/// Returns an error if the catalog database is not configured or the query
/// fails.
pub(crate) async fn run_catalog(
    config: &AppConfig,
    site_id: &str,
    limit: usize,
) -> anyhow::Result<()> {
    let pool = mrt_db::connect_catalog(config).await?;
    let rows = mrt_db::list_catalog_records(&pool, site_id).await?;
    let total = rows.len();
    for row in rows.into_iter().take(limit) {
        println!("{}", catalog_line(&CatalogRecord::from(row)));
    }
    eprintln!("{site_id}: showing {} of {total} stored releases", total.min(limit));
    Ok(())
}

fn catalog_line(record: &CatalogRecord) -> String {
    let price = match (record.price, record.currency.as_deref()) {
        (Some(price), Some(currency)) => format!("{price} {currency}"),
        (Some(price), None) => price.to_string(),
        (None, _) => "-".to_string(),
    };
    let status = record.status.map_or_else(|| "-".to_string(), |s| s.to_string());
    format!(
        "{} - {} [{}] {price} {status} {}",
        record.band, record.album, record.media, record.source_url
    )
}

/// Writes each record as one JSON line.
pub(crate) struct JsonLinesSink<W> {
    out: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

#[async_trait]
impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    async fn accept(&mut self, record: CatalogRecord) -> Result<(), ScraperError> {
        let persist_error = |reason: String| ScraperError::Persist {
            url: record.source_url.clone(),
            reason,
        };
        let line = serde_json::to_string(&record).map_err(|e| persist_error(e.to_string()))?;
        writeln!(self.out, "{line}").map_err(|e| persist_error(e.to_string()))
    }
}

#[cfg(test)]
#[path = "scrape_test.rs"]
mod tests;
