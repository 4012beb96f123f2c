//! Media-type inference from declared attributes, URL slugs and title words.

use mrt_core::{MediaRules, MediaToken, MediaType};

/// Classifies a release.
///
/// Precedence, first match wins:
/// 1. `declared` (structured data, attribute table, title format hint) when it
///    maps to a known media either by itself or through the site's aliases;
/// 2. site URL tokens, case-insensitive substring of `url`;
/// 3. site title tokens, case-insensitive whole-word match in `title`;
/// 4. [`MediaType::Unknown`].
#[must_use]
pub fn infer_media(
    url: &str,
    title: &str,
    declared: Option<&str>,
    rules: &MediaRules,
) -> MediaType {
    if let Some(media) = declared.and_then(|d| declared_media(d, &rules.declared_aliases)) {
        return media;
    }

    let url_lower = url.to_lowercase();
    if let Some(token) = rules
        .url_tokens
        .iter()
        .find(|t| url_lower.contains(&t.token.to_lowercase()))
    {
        return token.media;
    }

    if let Some(token) = rules
        .title_tokens
        .iter()
        .find(|t| contains_word(title, &t.token))
    {
        return token.media;
    }

    MediaType::Unknown
}

fn declared_media(value: &str, aliases: &[MediaToken]) -> Option<MediaType> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    MediaType::from_declared(value).or_else(|| {
        aliases
            .iter()
            .find(|a| a.token.trim().eq_ignore_ascii_case(value))
            .map(|a| a.media)
    })
}

/// Case-insensitive search for `word` in `text`. Boundaries are only enforced
/// on the sides where `word` itself starts or ends with an alphanumeric
/// character, so `"CD"` does not match inside `"ACID"`.
pub(crate) fn contains_word(text: &str, word: &str) -> bool {
    let word = word.trim();
    if word.is_empty() {
        return false;
    }
    let haystack = text.to_lowercase();
    let needle = word.to_lowercase();
    let check_start = needle.chars().next().is_some_and(char::is_alphanumeric);
    let check_end = needle.chars().last().is_some_and(char::is_alphanumeric);

    let mut from = 0;
    while let Some(pos) = haystack[from..].find(&needle) {
        let start = from + pos;
        let end = start + needle.len();
        let before_ok = !check_start
            || !haystack[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let after_ok = !check_end
            || !haystack[end..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
        if before_ok && after_ok {
            return true;
        }
        from = start + needle.chars().next().map_or(1, char::len_utf8);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(token: &str, media: MediaType) -> MediaToken {
        MediaToken {
            token: token.to_owned(),
            media,
        }
    }

    fn rules() -> MediaRules {
        MediaRules {
            declared_aliases: vec![token("Digipak", MediaType::Cd)],
            url_tokens: vec![
                token("-lp", MediaType::Lp),
                token("-cassette", MediaType::Tape),
                token("-cd", MediaType::Cd),
            ],
            title_tokens: vec![
                token("LP", MediaType::Lp),
                token("Tape", MediaType::Tape),
                token("CD", MediaType::Cd),
            ],
        }
    }

    #[test]
    fn declared_attribute_overrides_url_and_title() {
        let media = infer_media(
            "https://shop.example.com/products/album-lp",
            "Album LP",
            Some("Cassette"),
            &rules(),
        );
        assert_eq!(media, MediaType::Tape);
    }

    #[test]
    fn declared_alias_is_site_specific() {
        let media = infer_media("https://x/p", "", Some("digipak"), &rules());
        assert_eq!(media, MediaType::Cd);
        let media = infer_media("https://x/p", "", Some("digipak"), &MediaRules::default());
        assert_eq!(media, MediaType::Unknown);
    }

    #[test]
    fn unknown_declared_value_falls_through_to_url() {
        let media = infer_media(
            "https://shop.example.com/products/ALBUM-LP",
            "",
            Some("Remastered"),
            &rules(),
        );
        assert_eq!(media, MediaType::Lp);
    }

    #[test]
    fn url_tokens_are_checked_in_order() {
        let media = infer_media("https://x/products/band-album-cassette", "Album CD", None, &rules());
        assert_eq!(media, MediaType::Tape);
    }

    #[test]
    fn title_tokens_need_word_boundaries() {
        assert_eq!(
            infer_media("https://x/p/1", "Acid Bath - When the Kite String Pops", None, &rules()),
            MediaType::Unknown
        );
        assert_eq!(
            infer_media("https://x/p/1", "Sarcofago - Rotting ACID", None, &rules()),
            MediaType::Unknown
        );
        assert_eq!(
            infer_media("https://x/p/1", "Darkthrone - Panzerfaust (CD)", None, &rules()),
            MediaType::Cd
        );
    }

    #[test]
    fn nothing_matches_yields_unknown() {
        assert_eq!(
            infer_media("https://x/p/1", "Album", None, &rules()),
            MediaType::Unknown
        );
    }

    #[test]
    fn inference_is_deterministic() {
        let r = rules();
        let first = infer_media("https://x/a-lp", "Album Tape", Some("x"), &r);
        for _ in 0..10 {
            assert_eq!(infer_media("https://x/a-lp", "Album Tape", Some("x"), &r), first);
        }
    }

    #[test]
    fn contains_word_skips_boundary_for_punctuation_tokens() {
        assert!(contains_word("album-lp", "-lp"));
        assert!(contains_word("Live LP", "lp"));
        assert!(!contains_word("Help", "lp"));
        assert!(contains_word("2LP? no, LP!", "lp"));
    }
}
