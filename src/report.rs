//! Coverage report emitters.
//!
//! Every emitter renders the same [`DiffReport`]: a four-sheet workbook, a
//! markdown document and a JSON twin carrying the same totals and key lists.

/// JSON twin of the coverage report
mod json;
/// Markdown coverage document
mod markdown;
/// Multi-sheet workbook
mod spreadsheet;

use std::io;
use std::path::{
    Path,
    PathBuf,
};

use chrono::{
    DateTime,
    NaiveDate,
    Utc,
};
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

pub use json::{
    JsonReport,
    ReportTotals,
    render_json,
};
pub use markdown::render_markdown;
pub use spreadsheet::write_workbook;

use crate::analysis::DiffReport;
use crate::scanner::UsedKeySet;

/// File name stem shared by every report artifact.
pub const REPORT_STEM: &str = "translation-coverage";

/// Longest translation value written to a report cell.
pub const MAX_CELL_CHARS: usize = 100;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize JSON report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write spreadsheet {path}: {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
}

/// Everything an emitter needs to render one report.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub diff: &'a DiffReport,
    pub used: &'a UsedKeySet,
    pub generated_at: DateTime<Utc>,
    /// Upper bound on listed keys per markdown section.
    pub sample_size: usize,
}

/// Paths of the artifacts written by [`write_reports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub spreadsheet: PathBuf,
    pub markdown: PathBuf,
    pub json: PathBuf,
}

/// `translation-coverage-<YYYY-MM-DD>.<extension>`
#[must_use]
pub fn report_file_name(date: NaiveDate, extension: &str) -> String {
    format!("{REPORT_STEM}-{}.{extension}", date.format("%Y-%m-%d"))
}

/// Writes the workbook, the markdown document and the JSON twin into `dir`.
pub fn write_reports(context: &ReportContext<'_>, dir: &Path) -> Result<ReportPaths, ReportError> {
    std::fs::create_dir_all(dir)
        .map_err(|source| ReportError::Io { path: dir.to_path_buf(), source })?;

    let date = context.generated_at.date_naive();
    let paths = ReportPaths {
        spreadsheet: dir.join(report_file_name(date, "xlsx")),
        markdown: dir.join(report_file_name(date, "md")),
        json: dir.join(report_file_name(date, "json")),
    };

    write_workbook(context, &paths.spreadsheet)?;
    write_text(&paths.markdown, &render_markdown(context))?;
    write_text(&paths.json, &render_json(context)?)?;

    tracing::info!(dir = %dir.display(), "Wrote coverage reports");
    Ok(paths)
}

fn write_text(path: &Path, content: &str) -> Result<(), ReportError> {
    std::fs::write(path, content)
        .map_err(|source| ReportError::Io { path: path.to_path_buf(), source })
}

/// Truncates a value to [`MAX_CELL_CHARS`] characters.
fn cell_text(value: &str) -> String {
    value.chars().take(MAX_CELL_CHARS).collect()
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Comma-joined language list, `None` when empty.
fn language_list(languages: &[String]) -> String {
    if languages.is_empty() { "None".to_string() } else { languages.join(", ") }
}

/// `part / total` as a percentage with one decimal, rounded half up.
fn percent(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    let tenths = (part * 2000 + total) / (total * 2);
    format!("{}.{}%", tenths / 10, tenths % 10)
}
