//! Per-namespace aggregation of key statuses.

use indexmap::IndexMap;
use serde::Serialize;

use super::status::KeyStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSummary {
    pub namespace: String,
    pub total: usize,
    pub used: usize,
    /// Missing count per language, in configured order.
    pub missing: IndexMap<String, usize>,
    pub empty: IndexMap<String, usize>,
}

/// Groups statuses by namespace, largest namespace first, ties by name.
#[must_use]
pub fn summarize_namespaces(statuses: &[KeyStatus], languages: &[String]) -> Vec<NamespaceSummary> {
    let mut groups: IndexMap<&str, NamespaceSummary> = IndexMap::new();
    for status in statuses {
        let summary = groups.entry(status.namespace.as_str()).or_insert_with(|| NamespaceSummary {
            namespace: status.namespace.clone(),
            total: 0,
            used: 0,
            missing: languages.iter().map(|l| (l.clone(), 0)).collect(),
            empty: languages.iter().map(|l| (l.clone(), 0)).collect(),
        });
        summary.total += 1;
        if status.used {
            summary.used += 1;
        }
        for language in &status.missing_in {
            *summary.missing.entry(language.clone()).or_default() += 1;
        }
        for language in &status.empty_in {
            *summary.empty.entry(language.clone()).or_default() += 1;
        }
    }

    let mut summaries: Vec<_> = groups.into_values().collect();
    summaries.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.namespace.cmp(&b.namespace)));
    summaries
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::analysis::Priority;

    fn status(key: &str, used: bool, missing_in: &[&str], empty_in: &[&str]) -> KeyStatus {
        KeyStatus {
            key: key.to_string(),
            namespace: crate::types::namespace_of(key).to_string(),
            used,
            values: IndexMap::new(),
            missing_in: missing_in.iter().map(|l| (*l).to_string()).collect(),
            empty_in: empty_in.iter().map(|l| (*l).to_string()).collect(),
            priority: Priority::Low,
        }
    }

    #[googletest::test]
    fn sorts_by_size_then_name() {
        let statuses = vec![
            status("b.one", true, &[], &[]),
            status("a.one", false, &["fa"], &[]),
            status("c.one", true, &["fa", "ps"], &["ar"]),
            status("c.two", false, &["fa"], &[]),
        ];
        let languages = ["en", "ps", "fa", "ar"].map(String::from).to_vec();

        let summaries = summarize_namespaces(&statuses, &languages);

        expect_that!(
            summaries.iter().map(|s| s.namespace.as_str()).collect::<Vec<_>>(),
            elements_are![eq(&"c"), eq(&"a"), eq(&"b")]
        );
        let c = &summaries[0];
        expect_that!(c.total, eq(2));
        expect_that!(c.used, eq(1));
        expect_that!(c.missing.get("fa").copied(), some(eq(2)));
        expect_that!(c.missing.get("en").copied(), some(eq(0)));
        expect_that!(c.empty.get("ar").copied(), some(eq(1)));
    }
}
