use std::fmt::Write;

use indexmap::IndexMap;

use super::{
    ReportContext,
    language_list,
    percent,
};
use crate::analysis::{
    DiffReport,
    Priority,
};
use crate::scanner::UsedKeySet;
use crate::types::FlatKeySet;

/// Renders the coverage report as a markdown document.
#[must_use]
pub fn render_markdown(context: &ReportContext<'_>) -> String {
    let diff = context.diff;
    let limit = context.sample_size;

    let mut out = String::from("# Translation Coverage Report\n\n");
    let _ = writeln!(out, "Generated: {}\n", context.generated_at.to_rfc3339());

    summary_section(&mut out, diff);
    language_section(&mut out, diff);
    high_priority_section(&mut out, diff, context.used, limit);
    missing_from_reference_section(&mut out, diff, context.used, limit);

    let _ = writeln!(out, "## Missing Translations Of Used Keys\n");
    for (language, keys) in &diff.missing_used {
        if *language == diff.reference_language {
            continue;
        }
        let _ = writeln!(out, "### {language} ({})\n", keys.len());
        key_block(&mut out, keys, limit, "missing keys");
    }

    let _ = writeln!(out, "## Unused Translation Keys ({})\n", diff.unused.len());
    out.push_str("Declared in the schema but not used anywhere in the source tree.\n\n");
    key_block(&mut out, &diff.unused, limit, "unused keys");

    let _ = writeln!(out, "## Schema Drift\n");
    let drift = diff.schema_not_in_reference.len();
    let _ = writeln!(out, "### In Schema, Not In Reference ({drift})\n");
    key_block(&mut out, &diff.schema_not_in_reference, limit, "keys");
    let drift = diff.reference_not_in_schema.len();
    let _ = writeln!(out, "### In Reference, Not In Schema ({drift})\n");
    key_block(&mut out, &diff.reference_not_in_schema, limit, "keys");

    let _ = writeln!(out, "## Duplicate Keys ({})\n", diff.duplicate_total());
    for (language, counts) in diff.duplicates.iter().filter(|(_, c)| !c.is_empty()) {
        let _ = writeln!(out, "### {language}\n");
        for (key, count) in counts {
            let _ = writeln!(out, "- `{key}` defined {count} times");
        }
        out.push('\n');
    }

    let _ = writeln!(out, "## Suspect Untranslated Values\n");
    for (language, keys) in &diff.suspect_untranslated {
        let _ = writeln!(out, "### {language} ({})\n", keys.len());
        key_block(&mut out, keys, limit, "values");
    }

    namespace_section(&mut out, diff);
    out
}

/// Totals with percentages and the priority table.
fn summary_section(out: &mut String, diff: &DiffReport) {
    let total = diff.schema_key_count;
    let used = total - diff.unused.len().min(total);

    out.push_str("## Summary\n\n");
    let _ = writeln!(out, "- **Schema Keys**: {total}");
    let _ = writeln!(
        out,
        "- **Reference Keys ({})**: {}",
        diff.reference_language, diff.reference_key_count
    );
    let _ = writeln!(out, "- **Keys Used In Source**: {}", diff.used_key_count);
    let _ = writeln!(out, "- **Schema Keys Used**: {used} ({})", percent(used, total));
    let unused = diff.unused.len();
    let _ = writeln!(out, "- **Unused Keys**: {unused} ({})", percent(unused, total));
    let _ = writeln!(
        out,
        "- **Used But Missing From Reference**: {}",
        diff.used_but_missing_from_reference.len()
    );
    let _ = writeln!(out, "- **Missing Translations Of Used Keys**: {}", diff.missing_used_total());
    let _ = writeln!(out, "- **Duplicate Keys**: {}", diff.duplicate_total());
    out.push('\n');

    out.push_str("| Priority | Keys |\n|---|---|\n");
    for priority in [Priority::High, Priority::Medium, Priority::Low, Priority::Unused] {
        let _ = writeln!(out, "| {priority} | {} |", diff.priority_count(priority));
    }
    out.push('\n');
}

/// One row of counts per language.
fn language_section(out: &mut String, diff: &DiffReport) {
    out.push_str("## Languages\n\n");
    out.push_str(
        "| Language | Keys | Missing | Empty | Missing (used) | Not In Reference | Duplicates | Suspect |\n",
    );
    out.push_str("|---|---|---|---|---|---|---|---|\n");
    for language in &diff.languages {
        let present = diff.statuses.iter().filter(|s| s.exists_in(language)).count();
        let _ = writeln!(
            out,
            "| {language} | {present} | {} | {} | {} | {} | {} | {} |",
            count_of(&diff.missing, language),
            count_of(&diff.empty, language),
            count_of(&diff.missing_used, language),
            count_of(&diff.drift_not_in_reference, language),
            diff.duplicates.get(language).map_or(0, |d| d.values().map(|c| c - 1).sum()),
            count_of(&diff.suspect_untranslated, language),
        );
    }
    out.push('\n');
}

/// Used keys missing somewhere, with their first usage site.
fn high_priority_section(out: &mut String, diff: &DiffReport, used: &UsedKeySet, limit: usize) {
    let total = diff.priority_count(Priority::High);
    let _ = writeln!(out, "## High Priority Keys ({total})\n");
    out.push_str("Used in source and missing in at least one language.\n\n");
    for status in diff.statuses_with(Priority::High).take(limit) {
        let _ = write!(out, "- `{}`: missing in {}", status.key, language_list(&status.missing_in));
        if let Some(site) = used.sites(&status.key).first() {
            let _ = write!(out, " (first used at `{}`)", site.location);
        }
        out.push('\n');
    }
    more_line(out, total, limit, "high priority keys");
    out.push('\n');
}

/// Used keys absent from the reference, most used first.
fn missing_from_reference_section(
    out: &mut String,
    diff: &DiffReport,
    used: &UsedKeySet,
    limit: usize,
) {
    let keys = &diff.used_but_missing_from_reference;
    let _ = writeln!(out, "## Used Keys Missing From Reference ({})\n", keys.len());

    let mut ranked: Vec<(&String, usize, usize)> = keys
        .iter()
        .map(|key| {
            let sites = used.sites(key);
            let mut files: Vec<_> = sites.iter().map(|s| &s.location.file).collect();
            files.dedup();
            (key, sites.len(), files.len())
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    for (key, uses, files) in ranked.iter().take(limit) {
        let _ = writeln!(out, "- `{key}` - used {uses} time(s) in {files} file(s)");
    }
    more_line(out, keys.len(), limit, "keys");
    out.push('\n');
}

/// Per-namespace rollup table.
fn namespace_section(out: &mut String, diff: &DiffReport) {
    out.push_str("## By Namespace\n\n");
    let mut header = String::from("| Namespace | Total | Used |");
    let mut rule = String::from("|---|---|---|");
    for language in &diff.languages {
        let _ = write!(header, " {language} Missing | {language} Empty |");
        rule.push_str("---|---|");
    }
    let _ = writeln!(out, "{header}\n{rule}");

    for summary in &diff.namespaces {
        let _ = write!(out, "| {} | {} | {} |", summary.namespace, summary.total, summary.used);
        for language in &diff.languages {
            let missing = summary.missing.get(language).copied().unwrap_or_default();
            let empty = summary.empty.get(language).copied().unwrap_or_default();
            let _ = write!(out, " {missing} | {empty} |");
        }
        out.push('\n');
    }
}

/// Writes a fenced block of at most `limit` keys.
fn key_block(out: &mut String, keys: &FlatKeySet, limit: usize, noun: &str) {
    if keys.is_empty() {
        out.push_str("None.\n\n");
        return;
    }
    out.push_str("```\n");
    for key in keys.iter().take(limit) {
        let _ = writeln!(out, "{key}");
    }
    more_line(out, keys.len(), limit, noun);
    out.push_str("```\n\n");
}

/// `... and N more` when a list was cut at `limit`.
fn more_line(out: &mut String, total: usize, limit: usize, noun: &str) {
    if total > limit {
        let _ = writeln!(out, "... and {} more {noun}", total - limit);
    }
}

/// Size of `language`'s set, zero when absent.
fn count_of(sets: &IndexMap<String, FlatKeySet>, language: &str) -> usize {
    sets.get(language).map_or(0, FlatKeySet::len)
}
