//! Caller-driven category crawl.
//!
//! The crawler owns the `fetch -> extract -> next_page` loop for one site.
//! It runs strictly sequentially with a randomized pause before every
//! request after the first, and enforces the page ceiling per category.

use std::collections::HashSet;

use async_trait::async_trait;
use mrt_core::{CatalogRecord, ListingItem, MediaType, SiteRules};

use crate::client::Fetch;
use crate::detail::extract_detail;
use crate::error::ScraperError;
use crate::listing::extract_listing;
use crate::page::RawPage;
use crate::pagination::next_page;
use crate::rate_limit::RequestDelay;
use crate::rules::validate_rules;

/// Receives records as they are extracted.
#[async_trait]
pub trait RecordSink: Send {
    /// Persists or buffers one record.
    ///
    /// # Errors
    ///
    /// Implementations report write failures as [`ScraperError::Persist`].
    async fn accept(&mut self, record: CatalogRecord) -> Result<(), ScraperError>;
}

#[async_trait]
impl RecordSink for Vec<CatalogRecord> {
    async fn accept(&mut self, record: CatalogRecord) -> Result<(), ScraperError> {
        self.push(record);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CrawlOptions {
    /// Listing pages walked per category before the crawl gives up.
    pub max_pages: usize,
    pub delay: RequestDelay,
}

/// Aggregate counts for one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages: usize,
    pub listed: usize,
    pub extracted: usize,
    pub failed: usize,
    /// Category URLs whose traversal stopped on an error.
    pub aborted_categories: Vec<String>,
}

pub struct Crawler<'a> {
    site: &'a SiteRules,
    fetch: &'a dyn Fetch,
    options: CrawlOptions,
}

impl<'a> Crawler<'a> {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] or
    /// [`ScraperError::InvalidRule`] when the site's rules are malformed.
    pub fn new(
        site: &'a SiteRules,
        fetch: &'a dyn Fetch,
        options: CrawlOptions,
    ) -> Result<Self, ScraperError> {
        validate_rules(site)?;
        Ok(Self {
            site,
            fetch,
            options,
        })
    }

    /// Walks every configured category in order.
    pub async fn crawl_site(&self, sink: &mut dyn RecordSink) -> CrawlSummary {
        let urls: Vec<String> = self.site.categories.iter().map(|c| c.url.clone()).collect();
        self.crawl_categories(&urls, sink).await
    }

    /// Walks the given category URLs in order.
    ///
    /// A listing failure aborts only its category. Hitting the page ceiling
    /// aborts the rest of the site.
    pub async fn crawl_categories(
        &self,
        urls: &[String],
        sink: &mut dyn RecordSink,
    ) -> CrawlSummary {
        let mut summary = CrawlSummary::default();
        let mut first_request = true;

        for (index, url) in urls.iter().enumerate() {
            let media = self.site.category_media(url);
            tracing::info!(site = %self.site.id, category = %url, "crawling category");

            let result = self
                .crawl_category(url, media, sink, &mut summary, &mut first_request)
                .await;
            match result {
                Ok(()) => {}
                Err(e @ ScraperError::PaginationLimit { .. }) => {
                    tracing::error!(site = %self.site.id, category = %url, error = %e, "page ceiling reached; aborting site");
                    summary
                        .aborted_categories
                        .extend(urls[index..].iter().cloned());
                    break;
                }
                Err(e) => {
                    tracing::error!(site = %self.site.id, category = %url, error = %e, "category traversal failed");
                    summary.aborted_categories.push(url.clone());
                }
            }
        }

        tracing::info!(
            site = %self.site.id,
            pages = summary.pages,
            listed = summary.listed,
            extracted = summary.extracted,
            failed = summary.failed,
            aborted = summary.aborted_categories.len(),
            "crawl finished"
        );
        summary
    }

    async fn crawl_category(
        &self,
        start_url: &str,
        media: Option<MediaType>,
        sink: &mut dyn RecordSink,
        summary: &mut CrawlSummary,
        first_request: &mut bool,
    ) -> Result<(), ScraperError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut url = start_url.to_owned();
        let mut pages = 0usize;

        loop {
            self.pace(first_request).await;
            let body = self.fetch.fetch_text(&url).await?;
            pages += 1;
            summary.pages += 1;

            let (items, state) = {
                let page = RawPage::parse(url.as_str(), body);
                (extract_listing(&page, self.site)?, next_page(&page, self.site)?)
            };
            tracing::debug!(site = %self.site.id, url = %url, page = pages, items = items.len(), "listing page parsed");

            for item in items {
                if !seen.insert(item.detail_url.clone()) {
                    continue;
                }
                summary.listed += 1;
                self.pace(first_request).await;
                match self.crawl_item(&item, media, sink).await {
                    Ok(()) => summary.extracted += 1,
                    Err(e) => {
                        summary.failed += 1;
                        tracing::warn!(site = %self.site.id, url = %item.detail_url, error = %e, "item failed");
                    }
                }
            }

            let next = match state.next_url {
                Some(next) if state.has_next => next,
                _ => return Ok(()),
            };
            if pages >= self.options.max_pages {
                return Err(ScraperError::PaginationLimit {
                    url: start_url.to_owned(),
                    max_pages: self.options.max_pages,
                });
            }
            url = next;
        }
    }

    async fn crawl_item(
        &self,
        item: &ListingItem,
        media: Option<MediaType>,
        sink: &mut dyn RecordSink,
    ) -> Result<(), ScraperError> {
        let body = self.fetch.fetch_text(&item.detail_url).await?;
        let record = {
            let page = RawPage::parse(item.detail_url.as_str(), body);
            extract_detail(&page, self.site, Some(item), media)?
        };
        sink.accept(record).await
    }

    async fn pace(&self, first_request: &mut bool) {
        if std::mem::take(first_request) {
            return;
        }
        self.options.delay.wait().await;
    }
}
