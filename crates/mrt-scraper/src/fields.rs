//! Ordered fallback chains of field sources.
//!
//! Each detail field is described by a list of [`FieldSource`]s. Sources are
//! tried in order and the first one yielding non-empty text wins. A source
//! that finds nothing is not an error; a malformed selector or regex is.

use mrt_core::FieldSource;
use regex::Regex;

use crate::error::ScraperError;
use crate::page::{collapse_whitespace, element_text, non_empty_text, parse_selector, RawPage};
use crate::structured::StructuredProduct;

/// Everything a field source may read from.
#[derive(Clone, Copy)]
pub struct FieldContext<'a> {
    pub site: &'a str,
    pub page: &'a RawPage,
    pub structured: Option<&'a StructuredProduct>,
}

/// Evaluates `chain` in order, returning the first non-empty value.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSelector`] or [`ScraperError::InvalidRule`]
/// when a source is malformed.
pub fn resolve_chain(
    ctx: FieldContext<'_>,
    chain: &[FieldSource],
) -> Result<Option<String>, ScraperError> {
    for source in chain {
        if let Some(value) = resolve_source(ctx, source)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Evaluates a single source.
///
/// # Errors
///
/// See [`resolve_chain`].
pub fn resolve_source(
    ctx: FieldContext<'_>,
    source: &FieldSource,
) -> Result<Option<String>, ScraperError> {
    let value = match source {
        FieldSource::Structured(field) => ctx
            .structured
            .and_then(|p| p.field(*field))
            .map(str::to_owned),
        FieldSource::Meta(property) => meta_content(ctx.page, property),
        FieldSource::Text(selector) => ctx.page.select_first(selector)?.and_then(non_empty_text),
        FieldSource::Attr { selector, attr } => ctx
            .page
            .select_all(selector)?
            .into_iter()
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_owned),
        FieldSource::TableRow { table, label } => table_row(ctx.page, table, label)?,
        FieldSource::CategoryLink { selector, exclude } => ctx
            .page
            .select_all(selector)?
            .into_iter()
            .filter_map(non_empty_text)
            .find(|text| !exclude.iter().any(|e| e.trim().eq_ignore_ascii_case(text))),
        FieldSource::Pattern(pattern) => {
            let re = compile_pattern(ctx.site, pattern)?;
            re.captures(ctx.page.source()).and_then(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(0))
                    .map(|m| collapse_whitespace(m.as_str()))
            })
        }
    };
    Ok(value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty()))
}

pub(crate) fn compile_pattern(site: &str, pattern: &str) -> Result<Regex, ScraperError> {
    Regex::new(pattern).map_err(|e| ScraperError::InvalidRule {
        site: site.to_owned(),
        reason: format!("pattern {pattern:?}: {e}"),
    })
}

/// `content` of the first `<meta>` whose `property` or `name` equals `key`.
fn meta_content(page: &RawPage, key: &str) -> Option<String> {
    static META: std::sync::LazyLock<scraper::Selector> =
        std::sync::LazyLock::new(|| scraper::Selector::parse("meta").expect("valid selector"));

    page.document()
        .select(&META)
        .filter(|el| {
            let v = el.value();
            v.attr("property") == Some(key) || v.attr("name") == Some(key)
        })
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_owned)
}

/// Value cell of an attribute table row.
///
/// Rows are matched on their `th` text first (Magento "additional
/// information" layout), then on `td[data-th]` (responsive layout).
fn table_row(page: &RawPage, table: &str, label: &str) -> Result<Option<String>, ScraperError> {
    let Some(table) = page.select_first(table)? else {
        return Ok(None);
    };
    let row_sel = parse_selector("tr")?;
    let th_sel = parse_selector("th")?;
    let td_sel = parse_selector("td")?;
    let label = label.trim();

    for row in table.select(&row_sel) {
        let header = row.select(&th_sel).next().map(element_text);
        if header.is_some_and(|h| h.trim_end_matches(':').eq_ignore_ascii_case(label)) {
            if let Some(value) = row.select(&td_sel).next().and_then(non_empty_text) {
                return Ok(Some(value));
            }
        }
    }

    let data_th = table
        .select(&td_sel)
        .find(|td| {
            td.value()
                .attr("data-th")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(label))
        })
        .and_then(non_empty_text);
    Ok(data_th)
}

/// Selector strings referenced by a field source, for upfront validation.
pub(crate) fn source_selectors(source: &FieldSource) -> Vec<&str> {
    match source {
        FieldSource::Text(selector)
        | FieldSource::Attr { selector, .. }
        | FieldSource::CategoryLink { selector, .. } => vec![selector.as_str()],
        FieldSource::TableRow { table, .. } => vec![table.as_str()],
        FieldSource::Structured(_) | FieldSource::Meta(_) | FieldSource::Pattern(_) => vec![],
    }
}
