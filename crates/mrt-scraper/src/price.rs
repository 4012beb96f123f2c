use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d.,]*").expect("valid regex"));

/// Parses shop price text such as `"€12,99"`, `"R$ 1.299,90"` or `"19.50 USD"`.
///
/// Currency symbols and words are ignored; the first number is used. When
/// both `.` and `,` appear, the later one is the decimal separator. A single
/// comma followed by exactly three digits is a thousands separator, any other
/// lone comma is a decimal comma. Unparseable text yields `None`, never zero.
#[must_use]
pub fn parse_price(text: &str) -> Option<Decimal> {
    let raw = NUMBER.find(text)?.as_str().trim_end_matches(['.', ',']);
    if raw.is_empty() {
        return None;
    }

    let last_dot = raw.rfind('.');
    let last_comma = raw.rfind(',');
    let normalized = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => raw.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => raw.replace(',', ""),
        (None, Some(comma)) => {
            let decimals = raw.len() - comma - 1;
            if raw.matches(',').count() == 1 && decimals != 3 {
                raw.replace(',', ".")
            } else {
                raw.replace(',', "")
            }
        }
        (Some(_), None) if raw.matches('.').count() > 1 => raw.replace('.', ""),
        _ => raw.to_owned(),
    };

    Decimal::from_str(&normalized).ok()
}
