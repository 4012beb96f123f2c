//! Per-site extraction rules.
//!
//! Every supported retailer is described by one [`SiteRules`] value loaded
//! from `config/sites.yaml`. The scraper runs a single extraction engine
//! parameterized by these rules instead of carrying per-site control flow.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::MediaType;
use crate::ConfigError;

/// How pages of a site are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Plain HTTP GET.
    #[default]
    Direct,
    /// Through the anti-bot proxy.
    Flaresolverr,
}

/// One catalogue entry point, e.g. the "CDs" category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub url: String,
    /// Media listed by this category; used when nothing on the detail page
    /// identifies the format.
    #[serde(default)]
    pub media: Option<MediaType>,
}

/// Selectors for product tiles on a listing page. All selectors except
/// `container` and `item` are evaluated relative to one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRules {
    /// Element that must exist on every listing page. Its absence is a parse
    /// failure, whereas an existing container without tiles is an empty
    /// category.
    #[serde(default)]
    pub container: Option<String>,
    pub item: String,
    pub link: String,
    /// Combined "Band - Album" text, run through the title normalizer.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub band: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// How the next listing page URL is derived once a next control exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageStrategy {
    /// Follow the control's `href`.
    #[default]
    Link,
    /// Increment a query parameter, e.g. `?p=2`.
    QueryParam { name: String },
    /// Increment a path segment, e.g. `/page/2/`.
    PathSegment { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationRules {
    /// Selector for the "next" control.
    pub next: String,
    /// When set, the control only counts if its text contains this value.
    #[serde(default)]
    pub next_text: Option<String>,
    /// Classes marking a present-but-inert control.
    #[serde(default = "default_disabled_classes")]
    pub disabled_classes: Vec<String>,
    #[serde(default)]
    pub strategy: PageStrategy,
}

fn default_disabled_classes() -> Vec<String> {
    vec!["disabled".to_string()]
}

/// Where a site puts the release format inside product titles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatPlacement {
    /// `Band - Album (CD)`: stripped before the delimiter split.
    #[default]
    Parenthetical,
    /// `Band - Album Digipak CD`: vocabulary words stripped from the album
    /// after the split.
    SuffixTokens,
    /// `Band - Album - CD`: the last delimited segment.
    TrailingSegment,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRules {
    /// Delimiters tried in order; the first one present wins.
    pub delimiters: Vec<String>,
    #[serde(default)]
    pub format_placement: FormatPlacement,
    /// Closed vocabulary for [`FormatPlacement::SuffixTokens`].
    #[serde(default)]
    pub format_tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaToken {
    pub token: String,
    pub media: MediaType,
}

/// Site vocabulary for media inference. Lists are ordered; the first token
/// that matches decides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRules {
    /// Extra declared-attribute values, e.g. `Digipak` meaning CD.
    #[serde(default)]
    pub declared_aliases: Vec<MediaToken>,
    /// Case-insensitive substrings of the detail URL.
    #[serde(default)]
    pub url_tokens: Vec<MediaToken>,
    /// Whole-word, case-insensitive title tokens.
    #[serde(default)]
    pub title_tokens: Vec<MediaToken>,
}

/// Field of the embedded structured product block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredField {
    Name,
    Sku,
    Image,
    Price,
    Currency,
    Availability,
    Brand,
}

/// One strategy for finding a field value on a detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// A field of the JSON-LD product block.
    Structured(StructuredField),
    /// `content` of `<meta property=...>` or `<meta name=...>`.
    Meta(String),
    /// Text of the first element matching the selector.
    Text(String),
    /// Attribute of the first element matching the selector.
    Attr { selector: String, attr: String },
    /// Value cell of an attribute table row, looked up by header text or
    /// `data-th`.
    TableRow { table: String, label: String },
    /// First link whose text is not in `exclude` (case-insensitive).
    CategoryLink {
        selector: String,
        #[serde(default)]
        exclude: Vec<String>,
    },
    /// First capture group of a regex over the raw page source.
    Pattern(String),
}

/// Ordered fallback chains for each canonical field of a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRules {
    #[serde(default)]
    pub title: Vec<FieldSource>,
    #[serde(default)]
    pub band: Vec<FieldSource>,
    #[serde(default)]
    pub album: Vec<FieldSource>,
    #[serde(default)]
    pub sku: Vec<FieldSource>,
    #[serde(default)]
    pub price: Vec<FieldSource>,
    #[serde(default)]
    pub currency: Vec<FieldSource>,
    #[serde(default)]
    pub label: Vec<FieldSource>,
    #[serde(default)]
    pub genre: Vec<FieldSource>,
    #[serde(default)]
    pub photo_url: Vec<FieldSource>,
    #[serde(default)]
    pub release_date: Vec<FieldSource>,
    #[serde(default)]
    pub description: Vec<FieldSource>,
    #[serde(default)]
    pub format: Vec<FieldSource>,
    #[serde(default)]
    pub status: Vec<FieldSource>,
}

impl DetailRules {
    /// All chains with their field names, for validation and diagnostics.
    #[must_use]
    pub fn chains(&self) -> [(&'static str, &[FieldSource]); 13] {
        [
            ("title", &self.title),
            ("band", &self.band),
            ("album", &self.album),
            ("sku", &self.sku),
            ("price", &self.price),
            ("currency", &self.currency),
            ("label", &self.label),
            ("genre", &self.genre),
            ("photo_url", &self.photo_url),
            ("release_date", &self.release_date),
            ("description", &self.description),
            ("format", &self.format),
            ("status", &self.status),
        ]
    }
}

/// Everything the extraction engine needs to know about one retailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRules {
    pub id: String,
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub transport: Transport,
    pub categories: Vec<Category>,
    pub listing: ListingRules,
    pub pagination: PaginationRules,
    pub title: TitleRules,
    #[serde(default)]
    pub media: MediaRules,
    pub detail: DetailRules,
}

impl SiteRules {
    /// Media declared for the category whose URL matches `url`.
    #[must_use]
    pub fn category_media(&self, url: &str) -> Option<MediaType> {
        self.categories
            .iter()
            .find(|c| c.url.eq_ignore_ascii_case(url))
            .and_then(|c| c.media)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteRules>,
}

impl SitesFile {
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&SiteRules> {
        self.sites.iter().find(|s| s.id.eq_ignore_ascii_case(id))
    }
}

/// Load and validate site rules from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_sites(&content)
}

/// Parse and validate site rules from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text cannot be parsed or fails validation.
pub fn parse_sites(yaml: &str) -> Result<SitesFile, ConfigError> {
    let sites_file: SitesFile = serde_yaml::from_str(yaml)?;
    validate_sites(&sites_file)?;
    Ok(sites_file)
}

fn validate_sites(file: &SitesFile) -> Result<(), ConfigError> {
    if file.sites.is_empty() {
        return Err(ConfigError::Validation("no sites configured".into()));
    }

    let mut seen = HashSet::new();
    for site in &file.sites {
        if site.id.is_empty()
            || !site
                .id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ConfigError::Validation(format!(
                "site id \"{}\" must be a non-empty lowercase slug",
                site.id
            )));
        }
        if !seen.insert(site.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site id \"{}\"",
                site.id
            )));
        }
        validate_site(site)?;
    }
    Ok(())
}

fn validate_site(site: &SiteRules) -> Result<(), ConfigError> {
    let fail = |reason: String| ConfigError::Validation(format!("{}: {reason}", site.id));

    if !is_http_url(&site.base_url) {
        return Err(fail(format!("base_url \"{}\" is not http(s)", site.base_url)));
    }
    if site.categories.is_empty() {
        return Err(fail("at least one category is required".into()));
    }
    if let Some(bad) = site.categories.iter().find(|c| !is_http_url(&c.url)) {
        return Err(fail(format!("category url \"{}\" is not http(s)", bad.url)));
    }

    if site.listing.item.trim().is_empty() || site.listing.link.trim().is_empty() {
        return Err(fail("listing.item and listing.link are required".into()));
    }

    if site.pagination.next.trim().is_empty() {
        return Err(fail("pagination.next is required".into()));
    }
    match &site.pagination.strategy {
        PageStrategy::QueryParam { name } | PageStrategy::PathSegment { name }
            if name.trim().is_empty() =>
        {
            return Err(fail("pagination strategy needs a parameter name".into()));
        }
        _ => {}
    }

    if site.title.delimiters.is_empty() || site.title.delimiters.iter().any(String::is_empty) {
        return Err(fail("title.delimiters must be non-empty".into()));
    }
    if site.title.format_placement == FormatPlacement::SuffixTokens
        && site.title.format_tokens.is_empty()
    {
        return Err(fail(
            "suffix_tokens placement requires title.format_tokens".into(),
        ));
    }

    let media_tokens = site
        .media
        .declared_aliases
        .iter()
        .chain(&site.media.url_tokens)
        .chain(&site.media.title_tokens);
    for token in media_tokens {
        if token.token.trim().is_empty() || token.media == MediaType::Unknown {
            return Err(fail(format!(
                "media token \"{}\" must be non-empty and map to a known media",
                token.token
            )));
        }
    }

    let detail = &site.detail;
    let has_split_names = !detail.band.is_empty() && !detail.album.is_empty();
    if !has_split_names && detail.title.is_empty() {
        return Err(fail(
            "detail rules need either band and album chains or a title chain".into(),
        ));
    }

    Ok(())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

#[cfg(test)]
#[path = "sites_test.rs"]
mod tests;
