//! Core types used throughout the project.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
};

/// Separator between key segments.
pub const KEY_SEPARATOR: char = '.';

/// Flattened `key -> leaf string` view of a translation tree, in source order.
pub type FlatKeyMap = IndexMap<String, String>;

/// Lexically ordered key set.
pub type FlatKeySet = BTreeSet<String>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("translation key is empty")]
    Empty,
    #[error("translation key '{0}' contains an empty segment")]
    EmptySegment(String),
}

/// A validated dot-separated translation key.
///
/// Always has at least one segment and never an empty one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(String);

impl Key {
    /// Validates and wraps a key.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        if raw.is_empty() {
            return Err(KeyError::Empty);
        }
        if raw.split(KEY_SEPARATOR).any(str::is_empty) {
            return Err(KeyError::EmptySegment(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_SEPARATOR)
    }

    /// First segment of the key.
    #[must_use]
    pub fn namespace(&self) -> &str {
        namespace_of(&self.0)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Key {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Namespace (first segment) of a raw key string.
#[must_use]
pub fn namespace_of(key: &str) -> &str {
    key.split(KEY_SEPARATOR).next().unwrap_or(key)
}

/// Joins a parent prefix and a segment.
#[must_use]
pub fn join_key(prefix: Option<&str>, segment: &str) -> String {
    prefix.map_or_else(|| segment.to_string(), |p| format!("{p}{KEY_SEPARATOR}{segment}"))
}

/// A location in a scanned file (1-indexed line).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Path relative to the workspace root.
    pub file: PathBuf,
    pub line: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::single("common", vec!["common"])]
    #[case::nested("common.actions.save", vec!["common", "actions", "save"])]
    fn parse_valid_key(#[case] raw: &str, #[case] expected: Vec<&str>) {
        let key = Key::parse(raw).unwrap();

        assert_eq!(key.segments().collect::<Vec<_>>(), expected);
    }

    #[rstest]
    #[case::empty("", KeyError::Empty)]
    #[case::leading_dot(".common", KeyError::EmptySegment(".common".to_string()))]
    #[case::double_dot("common..save", KeyError::EmptySegment("common..save".to_string()))]
    #[case::trailing_dot("common.", KeyError::EmptySegment("common.".to_string()))]
    fn parse_invalid_key(#[case] raw: &str, #[case] expected: KeyError) {
        assert_eq!(Key::parse(raw), Err(expected));
    }

    #[rstest]
    fn namespace_is_first_segment() {
        assert_that!(Key::parse("students.form.name").unwrap().namespace(), eq("students"));
        assert_that!(namespace_of("nav"), eq("nav"));
    }

    #[rstest]
    fn key_deserialize_rejects_invalid() {
        let result: std::result::Result<Key, _> = serde_json::from_str(r#""a..b""#);

        assert!(result.is_err());
    }
}
