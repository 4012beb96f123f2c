//! Pagination walker.
//!
//! Given one fetched listing page, decides whether another page follows and
//! derives its URL. The walker never loops by itself; [`crate::Crawler`]
//! drives `fetch -> next_page -> fetch` and enforces the page ceiling.
//!
//! The only termination signal is the absence of a usable "next" control.
//! A control that is present but disabled (a `disabled` attribute,
//! `aria-disabled="true"`, or one of the site's disabled classes on the
//! control or its parent) counts as absent.

use mrt_core::{PageStrategy, SiteRules};
use scraper::ElementRef;

use crate::error::ScraperError;
use crate::listing::product_tiles;
use crate::page::{element_text, RawPage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub current_url: String,
    pub has_next: bool,
    pub next_url: Option<String>,
}

impl PaginationState {
    fn last(current_url: &str) -> Self {
        Self {
            current_url: current_url.to_owned(),
            has_next: false,
            next_url: None,
        }
    }
}

/// Derives the pagination state of `page`.
///
/// A page without product tiles reports `has_next = false` regardless of
/// controls, so an empty category ends the walk instead of erroring.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSelector`] for malformed pagination or
/// listing selectors.
pub fn next_page(page: &RawPage, rules: &SiteRules) -> Result<PaginationState, ScraperError> {
    let current = page.url();
    let has_items = product_tiles(page, rules)?.is_some_and(|tiles| !tiles.is_empty());
    if !has_items {
        return Ok(PaginationState::last(current));
    }

    let pagination = &rules.pagination;
    let control = page.select_all(&pagination.next)?.into_iter().find(|el| {
        let text_ok = pagination.next_text.as_deref().map_or(true, |wanted| {
            element_text(*el)
                .to_lowercase()
                .contains(&wanted.to_lowercase())
        });
        text_ok && !is_disabled(*el, &pagination.disabled_classes)
    });
    let Some(control) = control else {
        return Ok(PaginationState::last(current));
    };

    let next_url = match &pagination.strategy {
        PageStrategy::Link => control
            .value()
            .attr("href")
            .and_then(|href| page.absolute_url(href)),
        PageStrategy::QueryParam { name } => increment_query_param(current, name),
        PageStrategy::PathSegment { name } => increment_path_segment(current, name),
    };

    match next_url {
        Some(next) if next != current => Ok(PaginationState {
            current_url: current.to_owned(),
            has_next: true,
            next_url: Some(next),
        }),
        Some(_) => {
            tracing::warn!(url = %current, "next control points at the current page; stopping");
            Ok(PaginationState::last(current))
        }
        None => Ok(PaginationState::last(current)),
    }
}

fn is_disabled(el: ElementRef<'_>, disabled_classes: &[String]) -> bool {
    let value = el.value();
    if value.attr("disabled").is_some()
        || value
            .attr("aria-disabled")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    {
        return true;
    }
    let has_disabled_class = |e: ElementRef<'_>| {
        e.value()
            .classes()
            .any(|c| disabled_classes.iter().any(|d| d == c))
    };
    has_disabled_class(el)
        || el
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(has_disabled_class)
}

/// `?p=2` becomes `?p=3`; a missing parameter means the current page is 1.
pub(crate) fn increment_query_param(url: &str, name: &str) -> Option<String> {
    let mut parsed = reqwest::Url::parse(url).ok()?;
    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let current = pairs
        .iter()
        .find(|(k, _)| k == name)
        .and_then(|(_, v)| v.parse::<u32>().ok())
        .unwrap_or(1);
    let next = (current + 1).to_string();

    match pairs.iter_mut().find(|(k, _)| k == name) {
        Some(pair) => pair.1 = next,
        None => pairs.push((name.to_owned(), next)),
    }

    parsed.query_pairs_mut().clear().extend_pairs(&pairs);
    Some(parsed.into())
}

/// `/cds/page/2/` becomes `/cds/page/3/`; a path without the segment gets
/// `page/2` appended. A trailing slash is preserved.
pub(crate) fn increment_path_segment(url: &str, name: &str) -> Option<String> {
    let mut parsed = reqwest::Url::parse(url).ok()?;
    let path = parsed.path().to_owned();
    let trailing_slash = path.ends_with('/');
    let mut segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();

    let position = segments
        .windows(2)
        .rposition(|w| w[0] == name && w[1].parse::<u32>().is_ok());
    match position {
        Some(i) => {
            let current: u32 = segments[i + 1].parse().ok()?;
            segments[i + 1] = (current + 1).to_string();
        }
        None => {
            segments.push(name.to_owned());
            segments.push("2".to_owned());
        }
    }

    let mut new_path = format!("/{}", segments.join("/"));
    if trailing_slash {
        new_path.push('/');
    }
    parsed.set_path(&new_path);
    Some(parsed.into())
}

#[cfg(test)]
mod tests {
    use mrt_core::parse_sites;

    use super::*;

    fn site(pagination: &str) -> SiteRules {
        let yaml = format!(
            r#"
sites:
  - id: test
    name: Test
    base_url: https://shop.example.com
    categories:
      - url: https://shop.example.com/cds
    listing:
      item: li.product
      link: a
    pagination:
{pagination}
    title:
      delimiters: [" - "]
    detail:
      title:
        - text: h1
"#
        );
        parse_sites(&yaml).unwrap().sites.remove(0)
    }

    const TILE: &str = r#"<li class="product"><a href="/p/1">x</a></li>"#;

    #[test]
    fn link_strategy_follows_href() {
        let rules = site("      next: a.next");
        let page = RawPage::parse(
            "https://shop.example.com/cds?page=1",
            format!(r#"<ul>{TILE}</ul><a class="next" href="/cds?page=2">Next</a>"#),
        );
        let state = next_page(&page, &rules).unwrap();
        assert!(state.has_next);
        assert_eq!(
            state.next_url.as_deref(),
            Some("https://shop.example.com/cds?page=2")
        );
        assert_eq!(state.current_url, "https://shop.example.com/cds?page=1");
    }

    #[test]
    fn absent_control_ends_the_walk() {
        let rules = site("      next: a.next");
        let page = RawPage::parse("https://shop.example.com/cds", format!("<ul>{TILE}</ul>"));
        let state = next_page(&page, &rules).unwrap();
        assert!(!state.has_next);
        assert_eq!(state.next_url, None);
    }

    #[test]
    fn disabled_controls_count_as_absent() {
        let rules = site("      next: a.next");
        for control in [
            r#"<a class="next disabled" href="/cds?page=2">Next</a>"#,
            r#"<a class="next" aria-disabled="true" href="/cds?page=2">Next</a>"#,
            r#"<a class="next" disabled href="/cds?page=2">Next</a>"#,
            r#"<li class="disabled"><a class="next" href="/cds?page=2">Next</a></li>"#,
        ] {
            let page = RawPage::parse(
                "https://shop.example.com/cds",
                format!("<ul>{TILE}</ul><ul>{control}</ul>"),
            );
            assert!(!next_page(&page, &rules).unwrap().has_next, "{control}");
        }
    }

    #[test]
    fn next_text_picks_the_right_link() {
        let rules = site("      next: ul.pagination a\n      next_text: Next");
        let page = RawPage::parse(
            "https://www.paragonrecords.org/collections/cd?page=2",
            format!(
                r#"<ul>{TILE}</ul><ul class="pagination">
                   <li><a href="/collections/cd?page=1">Previous</a></li>
                   <li><a href="/collections/cd?page=3"><span>Next page</span></a></li>
                   </ul>"#
            ),
        );
        let state = next_page(&page, &rules).unwrap();
        assert_eq!(
            state.next_url.as_deref(),
            Some("https://www.paragonrecords.org/collections/cd?page=3")
        );
    }

    #[test]
    fn empty_listing_reports_no_next_page() {
        let rules = site("      next: a.next");
        let page = RawPage::parse(
            "https://shop.example.com/cds",
            r#"<ul></ul><a class="next" href="/cds?page=2">Next</a>"#,
        );
        assert!(!next_page(&page, &rules).unwrap().has_next);
    }

    #[test]
    fn query_param_strategy_increments_page_number() {
        let rules = site("      next: a.action.next\n      strategy:\n        kind: query_param\n        name: p");
        let page = RawPage::parse(
            "https://napalmrecords.com/english/music/tapes?product_list_dir=desc&p=2",
            format!(r#"<ul>{TILE}</ul><a class="action next" href="ignored">Next</a>"#),
        );
        let state = next_page(&page, &rules).unwrap();
        assert_eq!(
            state.next_url.as_deref(),
            Some("https://napalmrecords.com/english/music/tapes?product_list_dir=desc&p=3")
        );
    }

    #[test]
    fn query_param_defaults_to_page_one() {
        assert_eq!(
            increment_query_param("https://x.com/music/cds?order=release_date", "p").as_deref(),
            Some("https://x.com/music/cds?order=release_date&p=2")
        );
    }

    #[test]
    fn path_segment_strategy() {
        assert_eq!(
            increment_path_segment("https://blackmetalstore.com/categoria-produto/cds/", "page")
                .as_deref(),
            Some("https://blackmetalstore.com/categoria-produto/cds/page/2/")
        );
        assert_eq!(
            increment_path_segment(
                "https://blackmetalstore.com/categoria-produto/cds/page/7/",
                "page"
            )
            .as_deref(),
            Some("https://blackmetalstore.com/categoria-produto/cds/page/8/")
        );
        assert_eq!(
            increment_path_segment("https://x.com/list", "page").as_deref(),
            Some("https://x.com/list/page/2")
        );
    }

    #[test]
    fn self_referencing_link_stops_the_walk() {
        let rules = site("      next: a.next");
        let page = RawPage::parse(
            "https://shop.example.com/cds",
            format!(r#"<ul>{TILE}</ul><a class="next" href="/cds">Next</a>"#),
        );
        assert!(!next_page(&page, &rules).unwrap().has_next);
    }
}
