//! Listing-page field extractor: one [`ListingItem`] per product tile.

use std::collections::HashSet;

use mrt_core::{ListingItem, SiteRules};
use scraper::ElementRef;

use crate::error::ScraperError;
use crate::page::{non_empty_text, parse_selector, RawPage};
use crate::title::normalize_title;

/// Product tiles on `page`, in page order, one per distinct detail URL.
///
/// Tiles without a resolvable link are skipped. An empty result is a valid
/// empty category.
///
/// # Errors
///
/// - [`ScraperError::Parse`] if the site declares a listing container and the
///   page does not contain it.
/// - [`ScraperError::InvalidSelector`] for malformed listing selectors.
pub fn extract_listing(page: &RawPage, rules: &SiteRules) -> Result<Vec<ListingItem>, ScraperError> {
    let listing = &rules.listing;
    let tiles = product_tiles(page, rules)?.ok_or_else(|| ScraperError::Parse {
        url: page.url().to_owned(),
        reason: format!(
            "listing container \"{}\" not found",
            listing.container.as_deref().unwrap_or_default()
        ),
    })?;

    let link_sel = parse_selector(&listing.link)?;
    let title_sel = listing.title.as_deref().map(parse_selector).transpose()?;
    let band_sel = listing.band.as_deref().map(parse_selector).transpose()?;
    let album_sel = listing.album.as_deref().map(parse_selector).transpose()?;
    let label_sel = listing.label.as_deref().map(parse_selector).transpose()?;

    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for tile in tiles {
        let Some(detail_url) = tile
            .select(&link_sel)
            .filter_map(|a| a.value().attr("href"))
            .find_map(|href| page.absolute_url(href))
        else {
            continue;
        };
        if !seen.insert(detail_url.clone()) {
            continue;
        }

        let text_of = |sel: Option<&scraper::Selector>| {
            sel.and_then(|s| tile.select(s).next()).and_then(non_empty_text)
        };

        let mut band_raw = text_of(band_sel.as_ref());
        let mut album_raw = text_of(album_sel.as_ref());
        if let Some(title) = text_of(title_sel.as_ref()) {
            let normalized = normalize_title(&title, &rules.title);
            if band_raw.is_none() && !normalized.band.is_empty() {
                band_raw = Some(normalized.band);
            }
            if album_raw.is_none() {
                album_raw = Some(normalized.album);
            }
        }

        items.push(ListingItem {
            detail_url,
            band_raw,
            album_raw,
            label_raw: text_of(label_sel.as_ref()),
        });
    }

    Ok(items)
}

/// Tile elements, or `None` when a declared container is missing.
pub(crate) fn product_tiles<'p>(
    page: &'p RawPage,
    rules: &SiteRules,
) -> Result<Option<Vec<ElementRef<'p>>>, ScraperError> {
    let item_sel = parse_selector(&rules.listing.item)?;
    match rules.listing.container.as_deref() {
        Some(container) => {
            let Some(root) = page.select_first(container)? else {
                return Ok(None);
            };
            Ok(Some(root.select(&item_sel).collect()))
        }
        None => Ok(Some(page.document().select(&item_sel).collect())),
    }
}
