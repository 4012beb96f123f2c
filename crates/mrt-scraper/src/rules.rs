//! Upfront checks of a site's selectors and patterns.

use mrt_core::{FieldSource, SiteRules};

use crate::error::ScraperError;
use crate::fields::{compile_pattern, source_selectors};
use crate::page::parse_selector;

/// Parses every CSS selector and compiles every regex referenced by `site`,
/// so that a typo in `sites.yaml` fails before the first request instead of
/// on every detail page.
///
/// # Errors
///
/// Returns the first [`ScraperError::InvalidSelector`] or
/// [`ScraperError::InvalidRule`] found.
pub fn validate_rules(site: &SiteRules) -> Result<(), ScraperError> {
    let listing = &site.listing;
    let listing_selectors = [
        listing.container.as_deref(),
        Some(listing.item.as_str()),
        Some(listing.link.as_str()),
        listing.title.as_deref(),
        listing.band.as_deref(),
        listing.album.as_deref(),
        listing.label.as_deref(),
        Some(site.pagination.next.as_str()),
    ];
    for selector in listing_selectors.into_iter().flatten() {
        parse_selector(selector)?;
    }

    for (field, chain) in site.detail.chains() {
        for source in chain {
            for selector in source_selectors(source) {
                parse_selector(selector)?;
            }
            if let FieldSource::Pattern(pattern) = source {
                compile_pattern(&site.id, pattern).map_err(|e| ScraperError::InvalidRule {
                    site: site.id.clone(),
                    reason: format!("detail.{field}: {e}"),
                })?;
            }
        }
    }
    Ok(())
}
