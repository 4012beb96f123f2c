//! Canonical release records produced by the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Physical release format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "CD", alias = "cd")]
    Cd,
    #[serde(rename = "LP", alias = "lp")]
    Lp,
    #[serde(rename = "Tape", alias = "tape")]
    Tape,
    #[serde(rename = "Unknown", alias = "unknown")]
    Unknown,
}

impl MediaType {
    /// Maps a declared format value (structured data, attribute table,
    /// parenthesised title suffix) onto a known media type.
    ///
    /// Only whole-value matches count: `"CD"`, `"Vinyl"`, `"Cassette"`.
    /// Anything else returns `None` so that the caller can fall through to
    /// weaker signals.
    #[must_use]
    pub fn from_declared(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cd" | "cds" | "compact disc" => Some(Self::Cd),
            "lp" | "lps" | "vinyl" | "12\"" | "2lp" | "dlp" => Some(Self::Lp),
            "tape" | "tapes" | "cassette" | "cassettes" | "mc" => Some(Self::Tape),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Cd => write!(f, "CD"),
            MediaType::Lp => write!(f, "LP"),
            MediaType::Tape => write!(f, "Tape"),
            MediaType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Stock status advertised on a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseStatus {
    New,
    Restock,
    PreOrder,
}

impl ReleaseStatus {
    /// Parses free-form button or badge text such as `"Pre-Order now"`.
    #[must_use]
    pub fn from_label_text(text: &str) -> Option<Self> {
        let lower = text.trim().to_lowercase();
        if lower.contains("pre-order") || lower.contains("preorder") || lower.contains("pre order")
        {
            return Some(Self::PreOrder);
        }
        if lower.contains("restock") {
            return Some(Self::Restock);
        }
        if lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == "new") {
            return Some(Self::New);
        }
        None
    }
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseStatus::New => write!(f, "new"),
            ReleaseStatus::Restock => write!(f, "restock"),
            ReleaseStatus::PreOrder => write!(f, "preorder"),
        }
    }
}

/// One product tile on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    /// Absolute detail-page URL; unique within one listing page.
    pub detail_url: String,
    pub band_raw: Option<String>,
    pub album_raw: Option<String>,
    pub label_raw: Option<String>,
}

/// The canonical, site-independent release record.
///
/// `band` and `album` are always non-empty; every other field is `None`
/// when the source page did not provide it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Id of the site the record was scraped from.
    pub site: String,
    /// Detail page URL (purchase link).
    pub source_url: String,
    pub band: String,
    pub album: String,
    pub media: MediaType,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub label: Option<String>,
    pub genre: Option<String>,
    pub photo_url: Option<String>,
    pub release_date: Option<String>,
    pub description: Option<String>,
    pub status: Option<ReleaseStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_media_matches_whole_values_only() {
        assert_eq!(MediaType::from_declared("CD"), Some(MediaType::Cd));
        assert_eq!(MediaType::from_declared(" vinyl "), Some(MediaType::Lp));
        assert_eq!(MediaType::from_declared("Cassette"), Some(MediaType::Tape));
        assert_eq!(MediaType::from_declared("Digipak CD"), None);
        assert_eq!(MediaType::from_declared(""), None);
    }

    #[test]
    fn release_status_detects_preorder_variants() {
        assert_eq!(
            ReleaseStatus::from_label_text("Pre-Order"),
            Some(ReleaseStatus::PreOrder)
        );
        assert_eq!(
            ReleaseStatus::from_label_text("PREORDER NOW"),
            Some(ReleaseStatus::PreOrder)
        );
        assert_eq!(
            ReleaseStatus::from_label_text("Restock!"),
            Some(ReleaseStatus::Restock)
        );
        assert_eq!(ReleaseStatus::from_label_text("New"), Some(ReleaseStatus::New));
        assert_eq!(ReleaseStatus::from_label_text("Add to cart"), None);
        assert_eq!(ReleaseStatus::from_label_text("Renewal"), None);
    }

    #[test]
    fn media_type_serializes_with_display_names() {
        let json = serde_json::to_string(&MediaType::Cd).unwrap();
        assert_eq!(json, "\"CD\"");
        let back: MediaType = serde_json::from_str("\"tape\"").unwrap();
        assert_eq!(back, MediaType::Tape);
    }
}
