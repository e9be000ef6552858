//! Set algebra over schema, usage and per-language key sets.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use super::checks::{
    find_duplicates,
    suspect_untranslated,
};
use super::rollup::{
    NamespaceSummary,
    summarize_namespaces,
};
use super::status::{
    KeyStatus,
    Priority,
};
use crate::types::{
    FlatKeyMap,
    FlatKeySet,
    namespace_of,
};

/// Keys of one language module.
#[derive(Debug, Clone, Default)]
pub struct LanguageKeys {
    pub language: String,
    pub values: FlatKeyMap,
    /// Raw leaf paths in source order, repeated keys included.
    pub leaf_paths: Vec<String>,
}

impl LanguageKeys {
    fn key_set(&self) -> FlatKeySet {
        self.values.keys().cloned().collect()
    }
}

/// Everything the diff is computed from.
#[derive(Debug, Clone, Copy)]
pub struct DiffInput<'a> {
    pub schema: &'a FlatKeySet,
    pub used: &'a FlatKeySet,
    /// Every language in configured order, reference included.
    pub languages: &'a [LanguageKeys],
    pub reference_language: &'a str,
}

/// Result of [`compute_diff`]. Every set is lexically ordered; per-language
/// maps follow the configured language order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    pub reference_language: String,
    pub languages: Vec<String>,
    pub schema_key_count: usize,
    pub reference_key_count: usize,
    pub used_key_count: usize,
    /// `reference − keys(L)`
    pub missing: IndexMap<String, FlatKeySet>,
    /// `keys(L) − reference`
    pub drift_not_in_reference: IndexMap<String, FlatKeySet>,
    pub used_but_missing_from_reference: FlatKeySet,
    pub used_and_present_in_reference: FlatKeySet,
    /// Used keys present in the reference but absent in `L`.
    pub missing_used: IndexMap<String, FlatKeySet>,
    /// `schema − used`
    pub unused: FlatKeySet,
    /// Keys whose value is blank after trimming.
    pub empty: IndexMap<String, FlatKeySet>,
    /// Keys declared more than once in a module, with occurrence counts.
    pub duplicates: IndexMap<String, BTreeMap<String, usize>>,
    pub schema_not_in_reference: FlatKeySet,
    pub reference_not_in_schema: FlatKeySet,
    /// Non-reference values that still read like English.
    pub suspect_untranslated: IndexMap<String, FlatKeySet>,
    /// One status per key of `schema ∪ reference`.
    pub statuses: Vec<KeyStatus>,
    pub namespaces: Vec<NamespaceSummary>,
}

impl DiffReport {
    /// Sum of `missing_used` over every language.
    #[must_use]
    pub fn missing_used_total(&self) -> usize {
        self.missing_used.values().map(FlatKeySet::len).sum()
    }

    /// Sum of duplicated declarations (occurrences beyond the first).
    #[must_use]
    pub fn duplicate_total(&self) -> usize {
        self.duplicates.values().flat_map(BTreeMap::values).map(|count| count - 1).sum()
    }

    pub fn statuses_with(&self, priority: Priority) -> impl Iterator<Item = &KeyStatus> {
        self.statuses.iter().filter(move |status| status.priority == priority)
    }

    #[must_use]
    pub fn priority_count(&self, priority: Priority) -> usize {
        self.statuses_with(priority).count()
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Computes every difference set, the per-key statuses and the rollup.
#[must_use]
pub fn compute_diff(input: DiffInput<'_>) -> DiffReport {
    let empty_map = FlatKeyMap::new();
    let reference_values = input
        .languages
        .iter()
        .find(|l| l.language == input.reference_language)
        .map_or(&empty_map, |l| &l.values);
    let reference: FlatKeySet = reference_values.keys().cloned().collect();

    let used_but_missing_from_reference = input.used.difference(&reference).cloned().collect();
    let used_and_present_in_reference: FlatKeySet =
        input.used.intersection(&reference).cloned().collect();

    let mut report = DiffReport {
        reference_language: input.reference_language.to_string(),
        languages: input.languages.iter().map(|l| l.language.clone()).collect(),
        schema_key_count: input.schema.len(),
        reference_key_count: reference.len(),
        used_key_count: input.used.len(),
        used_but_missing_from_reference,
        unused: input.schema.difference(input.used).cloned().collect(),
        schema_not_in_reference: input.schema.difference(&reference).cloned().collect(),
        reference_not_in_schema: reference.difference(input.schema).cloned().collect(),
        ..DiffReport::default()
    };

    for language in input.languages {
        let name = language.language.clone();
        let keys = language.key_set();
        report.missing.insert(name.clone(), reference.difference(&keys).cloned().collect());
        report
            .drift_not_in_reference
            .insert(name.clone(), keys.difference(&reference).cloned().collect());
        report.missing_used.insert(
            name.clone(),
            used_and_present_in_reference.difference(&keys).cloned().collect(),
        );
        report.empty.insert(
            name.clone(),
            language.values.iter().filter(|(_, v)| is_blank(v)).map(|(k, _)| k.clone()).collect(),
        );
        report.duplicates.insert(name.clone(), find_duplicates(&language.leaf_paths));
        if name != input.reference_language {
            report.suspect_untranslated.insert(name, suspect_untranslated(&language.values));
        }
    }
    report.used_and_present_in_reference = used_and_present_in_reference;

    let universe: FlatKeySet = input.schema.union(&reference).cloned().collect();
    report.statuses = universe.iter().map(|key| key_status(key, &input)).collect();
    report.namespaces = summarize_namespaces(&report.statuses, &report.languages);

    tracing::debug!(
        keys = report.statuses.len(),
        unused = report.unused.len(),
        missing_used = report.missing_used_total(),
        "Computed translation diff"
    );
    report
}

fn key_status(key: &str, input: &DiffInput<'_>) -> KeyStatus {
    let mut values = IndexMap::new();
    let mut missing_in = Vec::new();
    let mut empty_in = Vec::new();
    for language in input.languages {
        let value = language.values.get(key).cloned();
        match value.as_deref() {
            None => missing_in.push(language.language.clone()),
            Some(v) if is_blank(v) => empty_in.push(language.language.clone()),
            Some(_) => {}
        }
        values.insert(language.language.clone(), value);
    }

    let used = input.used.contains(key);
    let priority = Priority::classify(used, !missing_in.is_empty(), !empty_in.is_empty());
    KeyStatus {
        key: key.to_string(),
        namespace: namespace_of(key).to_string(),
        used,
        values,
        missing_in,
        empty_in,
        priority,
    }
}
