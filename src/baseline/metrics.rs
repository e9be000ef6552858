//! Gate metrics derived from a translation diff.

use super::gate::Measurement;
use crate::analysis::DiffReport;

pub const MISSING_USED_TOTAL: &str = "missingUsedTotal";
pub const USED_MISSING_FROM_REFERENCE: &str = "usedMissingFromReference";
pub const DUPLICATE_KEYS: &str = "duplicateKeys";

/// Metric name for used keys missing in one language.
#[must_use]
pub fn missing_used_metric(language: &str) -> String {
    format!("missingUsed.{language}")
}

/// Measures the missing-keys metrics with their offending keys as samples.
#[must_use]
pub fn missing_keys_measurement(diff: &DiffReport) -> Measurement {
    let mut measurement =
        Measurement { headline: Some(MISSING_USED_TOTAL.to_string()), ..Measurement::default() };
    let mut all_missing = Vec::new();

    for (language, keys) in &diff.missing_used {
        if *language == diff.reference_language {
            continue;
        }
        let metric = missing_used_metric(language);
        measurement.metrics.insert(metric.clone(), keys.len());
        measurement.samples.insert(metric, keys.iter().cloned().collect());
        all_missing.extend(keys.iter().map(|key| format!("{language}: {key}")));
    }
    measurement.metrics.insert(MISSING_USED_TOTAL.to_string(), diff.missing_used_total());
    measurement.samples.insert(MISSING_USED_TOTAL.to_string(), all_missing);

    measurement.metrics.insert(
        USED_MISSING_FROM_REFERENCE.to_string(),
        diff.used_but_missing_from_reference.len(),
    );
    measurement.samples.insert(
        USED_MISSING_FROM_REFERENCE.to_string(),
        diff.used_but_missing_from_reference.iter().cloned().collect(),
    );

    measurement.metrics.insert(DUPLICATE_KEYS.to_string(), diff.duplicate_total());
    measurement.samples.insert(
        DUPLICATE_KEYS.to_string(),
        diff.duplicates
            .iter()
            .flat_map(|(language, counts)| {
                counts.iter().map(move |(key, count)| format!("{language}: {key} (x{count})"))
            })
            .collect(),
    );

    measurement
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use std::collections::BTreeMap;

    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use rstest::*;

    use super::*;
    use crate::test_utils::key_set;
    use crate::types::FlatKeySet;

    #[rstest]
    fn derives_every_metric() {
        let diff = DiffReport {
            reference_language: "en".to_string(),
            missing_used: IndexMap::from([
                ("en".to_string(), FlatKeySet::new()),
                ("ps".to_string(), key_set(&["a.y"])),
                ("fa".to_string(), key_set(&["a.x", "a.y"])),
            ]),
            used_but_missing_from_reference: key_set(&["ghost.key"]),
            duplicates: IndexMap::from([(
                "fa".to_string(),
                BTreeMap::from([("a.x".to_string(), 3)]),
            )]),
            ..DiffReport::default()
        };

        let measurement = missing_keys_measurement(&diff);

        assert_eq!(
            measurement.metrics,
            BTreeMap::from([
                ("duplicateKeys".to_string(), 2),
                ("missingUsed.fa".to_string(), 2),
                ("missingUsed.ps".to_string(), 1),
                ("missingUsedTotal".to_string(), 3),
                ("usedMissingFromReference".to_string(), 1),
            ])
        );
        assert_eq!(
            measurement.samples["missingUsedTotal"],
            vec!["ps: a.y", "fa: a.x", "fa: a.y"]
        );
        assert_eq!(measurement.samples["duplicateKeys"], vec!["fa: a.x (x3)"]);
    }
}
