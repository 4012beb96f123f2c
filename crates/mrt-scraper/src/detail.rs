//! Detail-page field extractor producing the canonical [`CatalogRecord`].

use mrt_core::{CatalogRecord, FieldSource, ListingItem, MediaType, ReleaseStatus, SiteRules};

use crate::error::ScraperError;
use crate::fields::{resolve_chain, FieldContext};
use crate::media::infer_media;
use crate::page::RawPage;
use crate::price::parse_price;
use crate::structured::extract_structured;
use crate::title::normalize_title;

/// Extracts one record from a detail page.
///
/// Band and album come from their own chains when the site has them, then
/// from the normalized page title, then from the listing tile. Media is
/// inferred from the declared format (format chain, else title hint), the
/// URL and the title; `category_media` is the last resort.
///
/// # Errors
///
/// - [`ScraperError::MissingField`] when band or album cannot be derived.
/// - [`ScraperError::InvalidSelector`] / [`ScraperError::InvalidRule`] for
///   malformed site rules.
pub fn extract_detail(
    page: &RawPage,
    rules: &SiteRules,
    listing: Option<&ListingItem>,
    category_media: Option<MediaType>,
) -> Result<CatalogRecord, ScraperError> {
    let structured = extract_structured(page);
    let ctx = FieldContext {
        site: &rules.id,
        page,
        structured: structured.as_ref(),
    };
    let detail = &rules.detail;
    let field = |chain: &[FieldSource]| resolve_chain(ctx, chain);

    let title = field(&detail.title)?;
    let normalized = title.as_deref().map(|t| normalize_title(t, &rules.title));

    let band = field(&detail.band)?
        .or_else(|| {
            normalized
                .as_ref()
                .map(|n| n.band.clone())
                .filter(|b| !b.is_empty())
        })
        .or_else(|| listing.and_then(|l| l.band_raw.clone()))
        .ok_or_else(|| missing(page, "band"))?;

    let album = field(&detail.album)?
        .or_else(|| {
            normalized
                .as_ref()
                .map(|n| n.album.trim().to_owned())
                .filter(|a| !a.is_empty())
        })
        .or_else(|| listing.and_then(|l| l.album_raw.clone()))
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| missing(page, "album"))?;

    let declared = field(&detail.format)?
        .or_else(|| normalized.as_ref().and_then(|n| n.format_hint.clone()));
    let media_title = title.as_deref().unwrap_or(&album);
    let media = match infer_media(page.url(), media_title, declared.as_deref(), &rules.media) {
        MediaType::Unknown => category_media.unwrap_or(MediaType::Unknown),
        known => known,
    };

    let price = field(&detail.price)?.as_deref().and_then(parse_price);
    let photo_url = field(&detail.photo_url)?.map(|src| page.absolute_url(&src).unwrap_or(src));
    let label = field(&detail.label)?.or_else(|| listing.and_then(|l| l.label_raw.clone()));
    let status = field(&detail.status)?
        .as_deref()
        .and_then(ReleaseStatus::from_label_text);

    Ok(CatalogRecord {
        site: rules.id.clone(),
        source_url: page.url().to_owned(),
        band,
        album,
        media,
        sku: field(&detail.sku)?,
        price,
        currency: field(&detail.currency)?,
        label,
        genre: field(&detail.genre)?,
        photo_url,
        release_date: field(&detail.release_date)?,
        description: field(&detail.description)?,
        status,
    })
}

fn missing(page: &RawPage, field: &'static str) -> ScraperError {
    ScraperError::MissingField {
        url: page.url().to_owned(),
        field,
    }
}

#[cfg(test)]
#[path = "detail_test.rs"]
mod tests;
