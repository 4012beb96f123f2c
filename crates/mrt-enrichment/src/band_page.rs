//! Reference-site band page parser.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static PHOTO: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a#photo img").expect("valid selector"));
static STATS_TERMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#band_stats dt").expect("valid selector"));

/// Separator between description parts.
pub const DESCRIPTION_SEPARATOR: &str = " | ";

/// Stats labels that make up the description, in output order, with the
/// prefix written before each value. `None` writes the bare value.
const DESCRIPTION_FIELDS: [(&str, Option<&str>); 4] = [
    ("Country of origin", None),
    ("Status", Some("Status")),
    ("Formed in", Some("Formed")),
    ("Themes", Some("Themes")),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandPage {
    pub photo_url: Option<String>,
    pub description: Option<String>,
}

/// Extracts the band photo and a one-line description from the stats block.
///
/// Missing stats are skipped. A page without any known stat has no
/// description.
#[must_use]
pub fn parse_band_page(html: &str) -> BandPage {
    let document = Html::parse_document(html);

    let photo_url = document
        .select(&PHOTO)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(str::to_owned);

    let stats: Vec<(String, String)> = document
        .select(&STATS_TERMS)
        .filter_map(|dt| {
            let label = text(dt).trim_end_matches(':').trim().to_owned();
            let value = dt
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "dd")
                .map(text)?;
            (!value.is_empty()).then_some((label, value))
        })
        .collect();

    let parts: Vec<String> = DESCRIPTION_FIELDS
        .iter()
        .filter_map(|(label, prefix)| {
            let value = stats
                .iter()
                .find(|(l, _)| l.eq_ignore_ascii_case(label))
                .map(|(_, v)| v)?;
            Some(match prefix {
                Some(prefix) => format!("{prefix}: {value}"),
                None => value.clone(),
            })
        })
        .collect();

    BandPage {
        photo_url,
        description: (!parts.is_empty()).then(|| parts.join(DESCRIPTION_SEPARATOR)),
    }
}

fn text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
