//! Old-to-new key mappings: validation and inference.

use std::collections::{
    BTreeMap,
    HashSet,
};
use std::fmt;
use std::path::{
    Path,
    PathBuf,
};

use serde::de::{
    MapAccess,
    Visitor,
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};
use thiserror::Error;

use crate::types::{
    FlatKeySet,
    KEY_SEPARATOR,
    Key,
    KeyError,
    namespace_of,
};

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Failed to read key mapping {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Key mapping must be a JSON object of old key to new key: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid key in mapping: {0}")]
    InvalidKey(#[from] KeyError),

    #[error("Mapping for '{0}' points to itself")]
    Identity(String),

    #[error("Key '{0}' is mapped more than once")]
    DuplicateOld(String),

    #[error("Mapping chains '{old}' -> '{new}' -> '{next}'; map '{old}' to the final key instead")]
    Chain { old: String, new: String, next: String },

    #[error("Mapping contains a cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// A validated `old -> new` key mapping.
///
/// Old keys are unique, no key maps to itself, and no new key is also an
/// old key, so applying the mapping twice changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyMapping {
    entries: BTreeMap<String, String>,
}

impl KeyMapping {
    pub fn new(pairs: Vec<(String, String)>) -> Result<Self, MappingError> {
        let mut entries = BTreeMap::new();
        for (old, new) in pairs {
            Key::parse(&old)?;
            Key::parse(&new)?;
            if old == new {
                return Err(MappingError::Identity(old));
            }
            if entries.contains_key(&old) {
                return Err(MappingError::DuplicateOld(old));
            }
            entries.insert(old, new);
        }

        for (old, new) in &entries {
            if let Some(next) = entries.get(new) {
                return Err(Self::cycle_from(&entries, old).unwrap_or_else(|| {
                    MappingError::Chain { old: old.clone(), new: new.clone(), next: next.clone() }
                }));
            }
        }

        Ok(Self { entries })
    }

    /// Follows the mapping from `start`; a walk that revisits a key is a cycle.
    fn cycle_from(entries: &BTreeMap<String, String>, start: &str) -> Option<MappingError> {
        let mut path = vec![start.to_string()];
        let mut seen: HashSet<&str> = HashSet::from([start]);
        let mut current = start;
        while let Some(next) = entries.get(current) {
            path.push(next.clone());
            if !seen.insert(next.as_str()) {
                return (next == start).then_some(MappingError::Cycle(path));
            }
            current = next;
        }
        None
    }

    /// Parses a JSON object of `"old": "new"` entries.
    pub fn from_json(text: &str) -> Result<Self, MappingError> {
        let OrderedPairs(pairs) = serde_json::from_str(text)?;
        Self::new(pairs)
    }

    pub fn read(path: &Path) -> Result<Self, MappingError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| MappingError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
    }

    /// New key for `old`, if mapped.
    #[must_use]
    pub fn target(&self, old: &str) -> Option<&str> {
        self.entries.get(old).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(old, new)| (old.as_str(), new.as_str()))
    }
}

/// Object entries in document order, repeated names included.
struct OrderedPairs(Vec<(String, String)>);

impl<'de> Deserialize<'de> for OrderedPairs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = OrderedPairs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping old keys to new keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, String>()? {
                    pairs.push(entry);
                }
                Ok(OrderedPairs(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

/// Candidate mappings for used keys that the reference does not define.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredMapping {
    /// Used keys with exactly one candidate.
    pub mapping: BTreeMap<String, String>,
    /// Used keys with several candidates, left for a human to decide.
    pub ambiguous: BTreeMap<String, Vec<String>>,
    pub unmatched: Vec<String>,
}

fn last_segment(key: &str) -> &str {
    key.rsplit(KEY_SEPARATOR).next().unwrap_or(key)
}

/// Whether the schema key `candidate` plausibly replaces the used key `used`.
///
/// The candidate ends with `.<used>`, or `used` ends with `.<candidate>`, or
/// both share their namespace and last segment.
fn is_candidate(used: &str, candidate: &str) -> bool {
    let suffix_of = |long: &str, short: &str| {
        long.strip_suffix(short).is_some_and(|head| head.ends_with(KEY_SEPARATOR))
    };
    suffix_of(candidate, used)
        || suffix_of(used, candidate)
        || (namespace_of(used) == namespace_of(candidate)
            && last_segment(used) == last_segment(candidate))
}

/// Matches every used-but-undefined key against the unused schema keys.
///
/// Only unique candidates are proposed; the result is never applied
/// automatically.
#[must_use]
pub fn infer_mapping(used_missing: &FlatKeySet, unused_schema: &FlatKeySet) -> InferredMapping {
    let mut inferred = InferredMapping::default();
    for used in used_missing {
        let mut candidates: Vec<String> = unused_schema
            .iter()
            .filter(|candidate| *candidate != used && is_candidate(used, candidate))
            .cloned()
            .collect();
        if candidates.len() > 1 {
            inferred.ambiguous.insert(used.clone(), candidates);
        } else if let Some(single) = candidates.pop() {
            inferred.mapping.insert(used.clone(), single);
        } else {
            inferred.unmatched.push(used.clone());
        }
    }
    inferred
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::test_utils::key_set;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(o, n)| ((*o).to_string(), (*n).to_string())).collect()
    }

    #[googletest::test]
    fn accepts_valid_mapping() {
        let mapping = KeyMapping::new(pairs(&[("old.a", "new.a"), ("old.b", "new.b")])).unwrap();

        expect_that!(mapping.len(), eq(2));
        expect_that!(mapping.target("old.a"), some(eq("new.a")));
        expect_that!(mapping.target("new.a"), none());
    }

    #[rstest]
    #[case::identity(&[("a.b", "a.b")])]
    #[case::invalid_key(&[("a.", "a.b")])]
    #[case::chain(&[("a.x", "a.y"), ("a.y", "a.z")])]
    #[case::cycle(&[("a.x", "a.y"), ("a.y", "a.x")])]
    fn rejects_invalid_mappings(#[case] raw: &[(&str, &str)]) {
        assert!(KeyMapping::new(pairs(raw)).is_err());
    }

    #[rstest]
    fn distinguishes_cycles_from_chains() {
        let cycle = KeyMapping::new(pairs(&[("a.x", "a.y"), ("a.y", "a.x")]));
        let chain = KeyMapping::new(pairs(&[("a.x", "a.y"), ("a.y", "a.z")]));

        assert!(matches!(cycle, Err(MappingError::Cycle(path)) if path == ["a.x", "a.y", "a.x"]));
        assert!(matches!(chain, Err(MappingError::Chain { old, .. }) if old == "a.x"));
    }

    #[rstest]
    fn json_detects_repeated_old_keys() {
        let result = KeyMapping::from_json(r#"{ "a.x": "b.x", "a.x": "c.x" }"#);

        assert!(matches!(result, Err(MappingError::DuplicateOld(key)) if key == "a.x"));
    }

    #[rstest]
    fn json_requires_string_values() {
        assert!(matches!(KeyMapping::from_json(r#"{ "a.x": 1 }"#), Err(MappingError::Parse(_))));
    }

    #[rstest]
    #[case::schema_has_prefix("save", "common.save", true)]
    #[case::used_has_prefix("pages.students.title", "students.title", true)]
    #[case::same_namespace_and_leaf("students.form.name", "students.name", true)]
    #[case::partial_segment("ave", "common.save", false)]
    #[case::different_namespace("students.name", "staff.name", false)]
    fn candidate_rules(#[case] used: &str, #[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(is_candidate(used, candidate), expected);
    }

    #[googletest::test]
    fn infers_unique_candidates_only() {
        let used_missing = key_set(&["save", "title", "ghost.key"]);
        let unused_schema = key_set(&["common.save", "students.title", "staff.title"]);

        let inferred = infer_mapping(&used_missing, &unused_schema);

        expect_that!(inferred.mapping.get("save").map(String::as_str), some(eq("common.save")));
        assert_eq!(inferred.ambiguous["title"], vec!["staff.title", "students.title"]);
        expect_that!(inferred.unmatched, elements_are![eq("ghost.key")]);
        assert!(KeyMapping::new(inferred.mapping.into_iter().collect()).is_ok());
    }
}
