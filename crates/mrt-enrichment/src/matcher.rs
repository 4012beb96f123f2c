//! Exact, normalized band-name lookup against the reference dataset.

use std::collections::HashMap;

use mrt_core::BandReference;

/// Reference entries keyed by [`normalize_name`].
#[derive(Debug, Clone, Default)]
pub struct ReferenceLookup {
    entries: HashMap<String, BandReference>,
    duplicates: Vec<String>,
}

impl ReferenceLookup {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalized names that appeared more than once in the input, in the
    /// order their first duplicate was seen.
    #[must_use]
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }
}

/// Trims surrounding whitespace and case-folds.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Builds the lookup. When two references share a normalized name the later
/// one replaces the earlier; the name is recorded in
/// [`ReferenceLookup::duplicates`].
pub fn build_lookup(references: impl IntoIterator<Item = BandReference>) -> ReferenceLookup {
    let mut lookup = ReferenceLookup::default();
    for reference in references {
        let key = normalize_name(&reference.name);
        if lookup.entries.insert(key.clone(), reference).is_some()
            && !lookup.duplicates.contains(&key)
        {
            lookup.duplicates.push(key);
        }
    }
    lookup
}

/// Exact match on the normalized name. No match is `None`, not an error.
#[must_use]
pub fn resolve<'a>(name: &str, lookup: &'a ReferenceLookup) -> Option<&'a BandReference> {
    lookup.entries.get(&normalize_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str, external_id: i64) -> BandReference {
        BandReference {
            name: name.to_owned(),
            external_id,
            genre: None,
        }
    }

    #[test]
    fn trailing_whitespace_and_case_are_ignored() {
        let lookup = build_lookup([reference("emperor ", 30)]);
        assert_eq!(resolve("Emperor", &lookup).map(|r| r.external_id), Some(30));
        assert_eq!(resolve("  EMPEROR\t", &lookup).map(|r| r.external_id), Some(30));
    }

    #[test]
    fn unique_names_all_resolve_and_absent_names_do_not() {
        let refs = vec![
            reference("Mayhem", 1),
            reference("Darkthrone", 2),
            reference("Burzum", 3),
        ];
        let lookup = build_lookup(refs.clone());
        assert_eq!(lookup.len(), 3);
        for r in &refs {
            assert_eq!(resolve(&r.name.to_uppercase(), &lookup), Some(r));
        }
        assert_eq!(resolve("Immortal", &lookup), None);
        assert!(lookup.duplicates().is_empty());
    }

    #[test]
    fn matching_is_exact_not_fuzzy() {
        let lookup = build_lookup([reference("Dark Throne", 2)]);
        assert_eq!(resolve("Darkthrone", &lookup), None);
        assert_eq!(resolve("Dark", &lookup), None);
    }

    #[test]
    fn last_duplicate_wins_and_is_reported() {
        let lookup = build_lookup([
            reference("Nightfall", 10),
            reference("NIGHTFALL", 11),
            reference("nightfall ", 12),
            reference("Rotting Christ", 20),
        ]);
        assert_eq!(lookup.len(), 2);
        assert_eq!(resolve("Nightfall", &lookup).map(|r| r.external_id), Some(12));
        assert_eq!(lookup.duplicates(), ["nightfall"]);
    }
}
