//! Data quality checks on individual translation modules.

use std::collections::BTreeMap;

use crate::types::{
    FlatKeyMap,
    FlatKeySet,
};

/// Keys declared more than once, with their occurrence count.
///
/// `leaf_paths` is the raw leaf list of a module in source order; a plain
/// object map keeps only the last occurrence, so the count comes from here.
#[must_use]
pub fn find_duplicates(leaf_paths: &[String]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for path in leaf_paths {
        *counts.entry(path.clone()).or_default() += 1;
    }
    counts.retain(|_, count| *count > 1);
    counts
}

/// Whether a non-reference value reads like untranslated English.
///
/// Placeholders in braces are ignored. At least two letters must remain and
/// more than 60% of them must be ASCII.
#[must_use]
pub fn looks_untranslated(value: &str) -> bool {
    let mut depth = 0usize;
    let mut letters = 0usize;
    let mut ascii = 0usize;
    for c in value.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            c if c.is_alphabetic() => {
                letters += 1;
                if c.is_ascii_alphabetic() {
                    ascii += 1;
                }
            }
            _ => {}
        }
    }
    letters >= 2 && ascii * 10 > letters * 6
}

/// Keys of `values` whose text looks untranslated.
#[must_use]
pub fn suspect_untranslated(values: &FlatKeyMap) -> FlatKeySet {
    values
        .iter()
        .filter(|(_, value)| looks_untranslated(value))
        .map(|(key, _)| key.clone())
        .collect()
}
