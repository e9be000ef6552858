use std::path::Path;

use indexmap::IndexMap;
use rust_xlsxwriter::{
    Format,
    Workbook,
    Worksheet,
    XlsxError,
};

use super::{
    ReportContext,
    ReportError,
    cell_text,
    language_list,
    yes_no,
};
use crate::analysis::{
    DiffReport,
    KeyStatus,
    Priority,
};
use crate::types::FlatKeySet;

/// A single worksheet cell.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cell {
    Text(String),
    Count(usize),
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<usize> for Cell {
    fn from(count: usize) -> Self {
        Self::Count(count)
    }
}

/// Writes the four-sheet coverage workbook to `path`.
pub fn write_workbook(context: &ReportContext<'_>, path: &Path) -> Result<(), ReportError> {
    build_workbook(context)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|source| ReportError::Spreadsheet { path: path.to_path_buf(), source })
}

/// Lays out every sheet in memory.
fn build_workbook(context: &ReportContext<'_>) -> Result<Workbook, XlsxError> {
    let diff = context.diff;
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name("Complete Coverage")?;
    write_table(
        sheet,
        &header,
        &coverage_header(diff),
        diff.statuses.iter().map(|s| coverage_row(s, diff)),
    )?;
    sheet.set_column_width(0, 50)?;

    let sheet = workbook.add_worksheet().set_name("High Priority")?;
    write_table(
        sheet,
        &header,
        &high_priority_header(diff),
        diff.statuses_with(Priority::High).map(|s| high_priority_row(s, diff)),
    )?;
    sheet.set_column_width(0, 50)?;

    let sheet = workbook.add_worksheet().set_name("Summary")?;
    let columns: [Cell; 2] = ["Metric".into(), "Value".into()];
    write_table(sheet, &header, &columns, summary_rows(context).into_iter())?;
    sheet.set_column_width(0, 40)?;

    let sheet = workbook.add_worksheet().set_name("By Namespace")?;
    write_table(sheet, &header, &namespace_header(diff), namespace_rows(diff).into_iter())?;
    sheet.set_column_width(0, 30)?;

    Ok(workbook)
}

/// Writes a bold, frozen header row followed by `rows`.
fn write_table(
    sheet: &mut Worksheet,
    header_format: &Format,
    header: &[Cell],
    rows: impl Iterator<Item = Vec<Cell>>,
) -> Result<(), XlsxError> {
    for (col, cell) in (0u16..).zip(header) {
        if let Cell::Text(text) = cell {
            sheet.write_string_with_format(0, col, text, header_format)?;
        }
    }
    sheet.set_freeze_panes(1, 0)?;

    for (row, cells) in (1u32..).zip(rows) {
        for (col, cell) in (0u16..).zip(&cells) {
            match cell {
                Cell::Text(text) => sheet.write_string(row, col, text)?,
                Cell::Count(count) => {
                    sheet.write_number(row, col, u32::try_from(*count).unwrap_or(u32::MAX))?
                }
            };
        }
    }
    Ok(())
}

/// Key, usage and priority, then exists/empty/value per language.
fn coverage_header(diff: &DiffReport) -> Vec<Cell> {
    let mut header: Vec<Cell> =
        vec!["Key".into(), "Namespace".into(), "Used".into(), "Priority".into()];
    for language in &diff.languages {
        let upper = language.to_uppercase();
        header.push(format!("{upper} Exists").into());
        header.push(format!("{upper} Empty").into());
        header.push(format!("{upper} Value").into());
    }
    header.push("Missing In".into());
    header.push("Empty In".into());
    header
}

/// One row per key status.
fn coverage_row(status: &KeyStatus, diff: &DiffReport) -> Vec<Cell> {
    let mut row: Vec<Cell> = vec![
        status.key.as_str().into(),
        status.namespace.as_str().into(),
        yes_no(status.used).into(),
        status.priority.label().into(),
    ];
    for language in &diff.languages {
        row.push(yes_no(status.exists_in(language)).into());
        row.push(yes_no(status.is_empty_in(language)).into());
        row.push(status.value_in(language).map_or_else(|| "None".to_string(), cell_text).into());
    }
    row.push(language_list(&status.missing_in).into());
    row.push(language_list(&status.empty_in).into());
    row
}

/// Key, namespace, gaps, then one value column per language.
fn high_priority_header(diff: &DiffReport) -> Vec<Cell> {
    let mut header: Vec<Cell> =
        vec!["Key".into(), "Namespace".into(), "Missing In".into(), "Empty In".into()];
    header.extend(diff.languages.iter().map(|l| Cell::Text(format!("{} Value", l.to_uppercase()))));
    header
}

/// Values for a high-priority key, blank where absent.
fn high_priority_row(status: &KeyStatus, diff: &DiffReport) -> Vec<Cell> {
    let mut row: Vec<Cell> = vec![
        status.key.as_str().into(),
        status.namespace.as_str().into(),
        language_list(&status.missing_in).into(),
        language_list(&status.empty_in).into(),
    ];
    row.extend(
        diff.languages
            .iter()
            .map(|l| Cell::Text(status.value_in(l).map(cell_text).unwrap_or_default())),
    );
    row
}

/// Metric/value pairs; blank rows separate the groups.
fn summary_rows(context: &ReportContext<'_>) -> Vec<Vec<Cell>> {
    let diff = context.diff;
    let statuses = &diff.statuses;
    let blank = || vec![Cell::from(""), Cell::from("")];
    let pair = |metric: String, value: usize| vec![Cell::Text(metric), Cell::Count(value)];

    let mut rows = vec![
        pair("Schema Keys".to_string(), diff.schema_key_count),
        pair("Reference Keys".to_string(), diff.reference_key_count),
        pair("Keys Used In Source".to_string(), diff.used_key_count),
        pair("Unused Keys".to_string(), diff.unused.len()),
        pair(
            "Used But Missing From Reference".to_string(),
            diff.used_but_missing_from_reference.len(),
        ),
        pair("In Schema, Not In Reference".to_string(), diff.schema_not_in_reference.len()),
        pair("In Reference, Not In Schema".to_string(), diff.reference_not_in_schema.len()),
    ];
    for priority in [Priority::High, Priority::Medium, Priority::Low, Priority::Unused] {
        rows.push(pair(format!("{priority} Priority Keys"), diff.priority_count(priority)));
    }

    rows.push(blank());
    rows.push(vec!["Language Coverage".into(), "".into()]);
    for language in &diff.languages {
        let upper = language.to_uppercase();
        let existing = statuses.iter().filter(|s| s.exists_in(language)).count();
        let empty = statuses.iter().filter(|s| s.is_empty_in(language)).count();
        rows.push(pair(format!("{upper} Total"), existing));
        rows.push(pair(format!("{upper} Missing"), statuses.len() - existing));
        rows.push(pair(format!("{upper} Empty"), empty));
    }

    rows.push(blank());
    rows.push(vec!["Missing Translations by Language".into(), "".into()]);
    for language in diff.languages.iter().filter(|l| **l != diff.reference_language) {
        let upper = language.to_uppercase();
        let count =
            |sets: &IndexMap<String, FlatKeySet>| sets.get(language).map_or(0, FlatKeySet::len);
        rows.push(pair(format!("Missing in {upper} (Used)"), count(&diff.missing_used)));
        rows.push(pair(format!("Not In Reference ({upper})"), count(&diff.drift_not_in_reference)));
        rows.push(pair(
            format!("Suspect Untranslated ({upper})"),
            count(&diff.suspect_untranslated),
        ));
    }
    for (language, counts) in &diff.duplicates {
        let extra = counts.values().map(|c| c - 1).sum();
        rows.push(pair(format!("Duplicate Keys ({})", language.to_uppercase()), extra));
    }

    rows.push(blank());
    rows.push(vec!["Generated At".into(), context.generated_at.to_rfc3339().into()]);
    rows
}

/// Namespace totals, then missing/empty per language.
fn namespace_header(diff: &DiffReport) -> Vec<Cell> {
    let mut header: Vec<Cell> = vec!["Namespace".into(), "Total Keys".into(), "Used Keys".into()];
    for language in &diff.languages {
        let upper = language.to_uppercase();
        header.push(format!("{upper} Missing").into());
        header.push(format!("{upper} Empty").into());
    }
    header
}

/// One row per namespace in rollup order.
fn namespace_rows(diff: &DiffReport) -> Vec<Vec<Cell>> {
    diff.namespaces
        .iter()
        .map(|summary| {
            let mut row: Vec<Cell> =
                vec![summary.namespace.as_str().into(), summary.total.into(), summary.used.into()];
            for language in &diff.languages {
                row.push(summary.missing.get(language).copied().unwrap_or_default().into());
                row.push(summary.empty.get(language).copied().unwrap_or_default().into());
            }
            row
        })
        .collect()
}
