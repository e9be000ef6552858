//! Per-key coverage status.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Work priority of a key.
///
/// Unused wins over everything; among used keys a missing translation is
/// high, a blank one medium, and a complete key low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
    Unused,
}

impl Priority {
    #[must_use]
    pub const fn classify(used: bool, missing_somewhere: bool, empty_somewhere: bool) -> Self {
        match (used, missing_somewhere, empty_somewhere) {
            (false, _, _) => Self::Unused,
            (true, true, _) => Self::High,
            (true, false, true) => Self::Medium,
            (true, false, false) => Self::Low,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Unused => "Unused",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coverage of one key across every language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatus {
    pub key: String,
    pub namespace: String,
    pub used: bool,
    /// Value per language in configured order; `None` when the key is absent.
    pub values: IndexMap<String, Option<String>>,
    pub missing_in: Vec<String>,
    pub empty_in: Vec<String>,
    pub priority: Priority,
}

impl KeyStatus {
    #[must_use]
    pub fn exists_in(&self, language: &str) -> bool {
        self.values.get(language).is_some_and(Option::is_some)
    }

    #[must_use]
    pub fn is_empty_in(&self, language: &str) -> bool {
        self.empty_in.iter().any(|l| l == language)
    }

    #[must_use]
    pub fn value_in(&self, language: &str) -> Option<&str> {
        self.values.get(language).and_then(Option::as_deref)
    }

    /// Present and non-blank in every language.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_in.is_empty() && self.empty_in.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::unused_even_if_missing(false, true, true, Priority::Unused)]
    #[case::unused_complete(false, false, false, Priority::Unused)]
    #[case::missing(true, true, false, Priority::High)]
    #[case::missing_and_empty(true, true, true, Priority::High)]
    #[case::empty(true, false, true, Priority::Medium)]
    #[case::complete(true, false, false, Priority::Low)]
    fn classify(
        #[case] used: bool,
        #[case] missing: bool,
        #[case] empty: bool,
        #[case] expected: Priority,
    ) {
        assert_eq!(Priority::classify(used, missing, empty), expected);
    }

    #[rstest]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), r#""medium""#);
    }
}
