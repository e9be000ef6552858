use std::collections::BTreeMap;

use chrono::{
    DateTime,
    Utc,
};
use serde::Serialize;

use super::ReportContext;
use crate::analysis::{
    DiffReport,
    Priority,
};
use crate::scanner::UsageSite;

/// Headline counts repeated at the top of the JSON twin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub schema_keys: usize,
    pub reference_keys: usize,
    pub used_keys: usize,
    pub unused_keys: usize,
    pub used_missing_from_reference: usize,
    pub missing_used_total: usize,
    pub duplicate_keys: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
}

impl ReportTotals {
    #[must_use]
    pub fn of(diff: &DiffReport) -> Self {
        Self {
            schema_keys: diff.schema_key_count,
            reference_keys: diff.reference_key_count,
            used_keys: diff.used_key_count,
            unused_keys: diff.unused.len(),
            used_missing_from_reference: diff.used_but_missing_from_reference.len(),
            missing_used_total: diff.missing_used_total(),
            duplicate_keys: diff.duplicate_total(),
            high_priority: diff.priority_count(Priority::High),
            medium_priority: diff.priority_count(Priority::Medium),
            low_priority: diff.priority_count(Priority::Low),
        }
    }
}

/// Machine-readable report: the full diff plus usage sites of keys that need work.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub totals: ReportTotals,
    #[serde(flatten)]
    pub diff: &'a DiffReport,
    /// Sites of used keys that are missing from the reference or high priority.
    pub usage_sites: BTreeMap<&'a str, &'a [UsageSite]>,
}

impl<'a> JsonReport<'a> {
    #[must_use]
    pub fn new(context: &ReportContext<'a>) -> Self {
        let diff = context.diff;
        let usage_sites = diff
            .used_but_missing_from_reference
            .iter()
            .map(String::as_str)
            .chain(diff.statuses_with(Priority::High).map(|s| s.key.as_str()))
            .map(|key| (key, context.used.sites(key)))
            .filter(|(_, sites)| !sites.is_empty())
            .collect();

        Self {
            generated_at: context.generated_at,
            totals: ReportTotals::of(diff),
            diff,
            usage_sites,
        }
    }
}

/// Pretty-printed JSON twin of the coverage report.
pub fn render_json(context: &ReportContext<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport::new(context))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    use super::*;
    use crate::scanner::{
        KeyUsage,
        UsageKind,
        UsedKeySet,
    };
    use crate::types::FlatKeySet;

    #[rstest]
    fn carries_totals_diff_and_sites() {
        let diff = DiffReport {
            reference_language: "en".to_string(),
            languages: vec!["en".to_string(), "fa".to_string()],
            schema_key_count: 3,
            used_key_count: 2,
            used_but_missing_from_reference: FlatKeySet::from(["ghost.key".to_string()]),
            unused: FlatKeySet::from(["old.key".to_string()]),
            ..DiffReport::default()
        };
        let mut used = UsedKeySet::default();
        used.record(
            PathBuf::from("src/App.tsx"),
            KeyUsage { key: "ghost.key".to_string(), kind: UsageKind::NotifierCall, line: 7 },
        );
        used.record(
            PathBuf::from("src/App.tsx"),
            KeyUsage { key: "common.save".to_string(), kind: UsageKind::DirectCall, line: 3 },
        );
        let context = ReportContext {
            diff: &diff,
            used: &used,
            generated_at: Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap(),
            sample_size: 50,
        };

        let value: serde_json::Value =
            serde_json::from_str(&render_json(&context).unwrap()).unwrap();

        assert_eq!(value["generatedAt"], json!("2026-03-09T12:00:00Z"));
        assert_eq!(value["totals"]["unusedKeys"], json!(1));
        assert_eq!(value["totals"]["usedMissingFromReference"], json!(1));
        assert_eq!(value["unused"], json!(["old.key"]));
        assert_eq!(
            value["usageSites"],
            json!({
                "ghost.key": [{
                    "location": { "file": "src/App.tsx", "line": 7 },
                    "kind": "notifierCall"
                }]
            })
        );
    }
}
