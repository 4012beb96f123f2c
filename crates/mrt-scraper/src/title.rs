//! Title normalizer: splits combined "Band – Album (Format)" strings.
//!
//! Sites disagree on where the format goes. Some append it in parentheses
//! (stripped before the delimiter split), some append bare vocabulary words
//! to the album (stripped after the split), some use a trailing delimited
//! segment. [`normalize_title`] handles all three from [`TitleRules`].

use std::sync::LazyLock;

use mrt_core::{FormatPlacement, TitleRules};
use regex::Regex;

/// Delimiters tried after the site's own list.
pub const GENERIC_DELIMITERS: [&str; 3] = [" \u{2013} ", " \u{2014} ", " - "];

static TRAILING_PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)\s*$").expect("valid regex"));

/// Result of [`normalize_title`]. `band` is empty when no delimiter matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTitle {
    pub band: String,
    pub album: String,
    pub format_hint: Option<String>,
}

impl NormalizedTitle {
    fn unsplit(raw: &str) -> Self {
        Self {
            band: String::new(),
            album: raw.to_owned(),
            format_hint: None,
        }
    }
}

/// Splits `raw` into band, album and an optional format hint.
///
/// Without a recognized delimiter the result is `band = ""`, `album = raw`
/// (unchanged) and no hint. Format stripping never empties the album.
#[must_use]
pub fn normalize_title(raw: &str, rules: &TitleRules) -> NormalizedTitle {
    let title = raw.trim();
    if title.is_empty() {
        return NormalizedTitle::unsplit(raw);
    }

    match rules.format_placement {
        FormatPlacement::Parenthetical => {
            let (body, hint) = strip_trailing_parenthetical(title);
            match split_once(body, rules) {
                Some((band, album, _)) => NormalizedTitle {
                    band: band.to_owned(),
                    album: album.to_owned(),
                    format_hint: hint,
                },
                None => NormalizedTitle::unsplit(raw),
            }
        }
        FormatPlacement::SuffixTokens => match split_once(title, rules) {
            Some((band, album, _)) => {
                let (album, hint) = strip_suffix_tokens(album, &rules.format_tokens);
                NormalizedTitle {
                    band: band.to_owned(),
                    album: album.to_owned(),
                    format_hint: hint,
                }
            }
            None => NormalizedTitle::unsplit(raw),
        },
        FormatPlacement::TrailingSegment => match split_once(title, rules) {
            Some((band, rest, delimiter)) => {
                // `Band - Album - Format`; an album may itself contain the delimiter.
                match rest.rsplit_once(delimiter) {
                    Some((album, format))
                        if !album.trim().is_empty() && !format.trim().is_empty() =>
                    {
                        NormalizedTitle {
                            band: band.to_owned(),
                            album: album.trim().to_owned(),
                            format_hint: Some(format.trim().to_owned()),
                        }
                    }
                    _ => NormalizedTitle {
                        band: band.to_owned(),
                        album: rest.to_owned(),
                        format_hint: None,
                    },
                }
            }
            None => NormalizedTitle::unsplit(raw),
        },
        FormatPlacement::None => match split_once(title, rules) {
            Some((band, album, _)) => NormalizedTitle {
                band: band.to_owned(),
                album: album.to_owned(),
                format_hint: None,
            },
            None => NormalizedTitle::unsplit(raw),
        },
    }
}

/// Splits on the first delimiter (site list first, then generic ones) that
/// occurs with non-empty text on both sides. Returns the trimmed halves and
/// the delimiter used.
fn split_once<'a, 'r>(
    title: &'a str,
    rules: &'r TitleRules,
) -> Option<(&'a str, &'a str, &'r str)> {
    let site = rules.delimiters.iter().map(String::as_str);
    let generic = GENERIC_DELIMITERS
        .iter()
        .copied()
        .filter(|g| !rules.delimiters.iter().any(|d| d == g));

    for delimiter in site.chain(generic) {
        if delimiter.is_empty() {
            continue;
        }
        if let Some((left, right)) = title.split_once(delimiter) {
            let (left, right) = (left.trim(), right.trim());
            if !left.is_empty() && !right.is_empty() {
                return Some((left, right, delimiter));
            }
        }
    }
    None
}

/// `"Album (CD)"` becomes `("Album", Some("CD"))`. A title that is only a
/// parenthetical is left alone.
fn strip_trailing_parenthetical(title: &str) -> (&str, Option<String>) {
    let Some(caps) = TRAILING_PARENTHETICAL.captures(title) else {
        return (title, None);
    };
    let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
        return (title, None);
    };
    let body = title[..whole.start()].trim_end();
    let hint = inner.as_str().trim();
    if body.is_empty() || hint.is_empty() {
        return (title, None);
    }
    (body, Some(hint.to_owned()))
}

/// Repeatedly strips trailing words found in `tokens` (case-insensitive).
/// The removed words, in their original order and casing, form the hint.
pub(crate) fn strip_suffix_tokens<'a>(
    text: &'a str,
    tokens: &[String],
) -> (&'a str, Option<String>) {
    let mut result = text.trim_end();
    let mut removed: Vec<&str> = Vec::new();

    'outer: loop {
        for token in tokens {
            if let Some((rest, word)) = strip_suffix_token(result, token) {
                if rest.is_empty() {
                    break 'outer;
                }
                removed.push(word);
                result = rest;
                continue 'outer;
            }
        }
        break;
    }

    if removed.is_empty() {
        return (result, None);
    }
    removed.reverse();
    (result, Some(removed.join(" ")))
}

/// Matches `" TOKEN"` at the end of `text`, returning the remainder and the
/// matched word.
fn strip_suffix_token<'a>(text: &'a str, token: &str) -> Option<(&'a str, &'a str)> {
    if token.is_empty() {
        return None;
    }
    let cut = text.len().checked_sub(token.len() + 1)?;
    if !text.is_char_boundary(cut) || text.as_bytes()[cut] != b' ' {
        return None;
    }
    let word = &text[cut + 1..];
    word.eq_ignore_ascii_case(token)
        .then(|| (text[..cut].trim_end(), word))
}

#[cfg(test)]
#[path = "title_test.rs"]
mod tests;
