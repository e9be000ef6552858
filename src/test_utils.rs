//! Builders shared by unit tests.
#![cfg(test)]

use std::path::PathBuf;

use crate::analysis::LanguageKeys;
use crate::scanner::{
    KeyUsage,
    SourceText,
    UsageKind,
    UsedKeySet,
};
use crate::types::FlatKeySet;

/// Owned key set from string literals.
pub(crate) fn key_set(keys: &[&str]) -> FlatKeySet {
    keys.iter().map(|k| (*k).to_string()).collect()
}

/// A source file under the `/ws` workspace root.
pub(crate) fn source_text(relative: &str, text: &str) -> SourceText {
    SourceText {
        path: PathBuf::from("/ws").join(relative),
        relative: PathBuf::from(relative),
        text: text.to_string(),
    }
}

/// Flattened keys of one language; repeated entries stay in `leaf_paths`.
pub(crate) fn language_keys(name: &str, entries: &[(&str, &str)]) -> LanguageKeys {
    LanguageKeys {
        language: name.to_string(),
        values: entries.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
        leaf_paths: entries.iter().map(|(k, _)| (*k).to_string()).collect(),
    }
}

/// Direct-call usages given as `(key, file, line)`.
pub(crate) fn used_keys(entries: &[(&str, &str, usize)]) -> UsedKeySet {
    let mut used = UsedKeySet::default();
    for (key, file, line) in entries {
        used.record(
            PathBuf::from(file),
            KeyUsage { key: (*key).to_string(), kind: UsageKind::DirectCall, line: *line },
        );
    }
    used
}
