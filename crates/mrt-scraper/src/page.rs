//! Parsed page handle shared by the listing, detail and pagination extractors.

use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;

/// A fetched page: its URL, raw source and parsed DOM.
///
/// `scraper::Html` is not `Send`, so a `RawPage` must be created, read and
/// dropped between two `.await` points.
pub struct RawPage {
    url: String,
    source: String,
    document: Html,
}

impl RawPage {
    #[must_use]
    pub fn parse(url: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let document = Html::parse_document(&source);
        Self {
            url: url.into(),
            source,
            document,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw HTML, used by regex field sources and inline-script scans.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn document(&self) -> &Html {
        &self.document
    }

    /// First element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if `selector` does not parse.
    pub fn select_first(&self, selector: &str) -> Result<Option<ElementRef<'_>>, ScraperError> {
        let parsed = parse_selector(selector)?;
        Ok(self.document.select(&parsed).next())
    }

    /// All elements matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if `selector` does not parse.
    pub fn select_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>, ScraperError> {
        let parsed = parse_selector(selector)?;
        Ok(self.document.select(&parsed).collect())
    }

    /// Resolves `href` against this page's URL.
    #[must_use]
    pub fn absolute_url(&self, href: &str) -> Option<String> {
        absolute_url(&self.url, href)
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::InvalidSelector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

/// Visible text of `element` with whitespace runs collapsed to one space.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    let joined: String = element.text().collect();
    collapse_whitespace(&joined)
}

/// Like [`element_text`] but `None` when the text is empty.
pub(crate) fn non_empty_text(element: ElementRef<'_>) -> Option<String> {
    let text = element_text(element);
    (!text.is_empty()).then_some(text)
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn absolute_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    let base = reqwest::Url::parse(base).ok()?;
    base.join(href).ok().map(String::from)
}
