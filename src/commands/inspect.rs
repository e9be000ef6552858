use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;

use crate::config::ConfigManager;
use crate::error::ToolError;
use crate::mutation::infer_mapping;
use crate::report::{
    ReportContext,
    ReportError,
    write_reports,
};
use crate::scanner::{
    UsageKind,
    UsageScanner,
};
use crate::workspace::Workspace;

/// File name of the infer-mapping proposal inside the report directory.
const INFERRED_MAPPING_FILE: &str = "inferred-mapping.json";

/// Scans the source tree and logs what was found.
pub(super) async fn scan(config: ConfigManager) -> Result<(), ToolError> {
    let scanner = UsageScanner::new(config.workspace_root().to_path_buf(), config.get_settings())?;
    let used = scanner.scan().await;

    let mut by_kind: BTreeMap<UsageKind, usize> = BTreeMap::new();
    let mut sites = 0;
    for (key, key_sites) in used.iter() {
        tracing::debug!(key, uses = key_sites.len(), "Used key");
        sites += key_sites.len();
        for site in key_sites {
            *by_kind.entry(site.kind).or_default() += 1;
        }
    }
    for (kind, count) in &by_kind {
        tracing::info!(kind = ?kind, count, "Usages by call shape");
    }

    tracing::info!(
        files = used.files_scanned,
        keys = used.len(),
        sites,
        "Scan complete: {} unique key(s) used across {} file(s)",
        used.len(),
        used.files_scanned
    );
    Ok(())
}

/// Writes the coverage reports.
pub(super) async fn report(
    config: ConfigManager,
    output: Option<PathBuf>,
) -> Result<(), ToolError> {
    let workspace = Workspace::load(config).await?;
    let settings = workspace.settings();
    let diff = workspace.diff();

    let dir = output.unwrap_or_else(|| workspace.config().resolve(&settings.output.report_dir));
    let paths = write_reports(
        &ReportContext {
            diff: &diff,
            used: &workspace.used,
            generated_at: Utc::now(),
            sample_size: settings.sample_size,
        },
        &dir,
    )?;

    tracing::info!(
        spreadsheet = %workspace.relative(&paths.spreadsheet).display(),
        markdown = %workspace.relative(&paths.markdown).display(),
        json = %workspace.relative(&paths.json).display(),
        "Reports written"
    );
    tracing::info!(
        schema_keys = diff.schema_key_count,
        used = diff.used_key_count,
        unused = diff.unused.len(),
        missing_used = diff.missing_used_total(),
        used_missing_from_reference = diff.used_but_missing_from_reference.len(),
        duplicates = diff.duplicate_total(),
        "Report complete"
    );
    Ok(())
}

/// Proposes mappings for used keys the reference lacks; never applies them.
///
/// Only unique candidates are written, in the format `rewrite --mapping`
/// reads.
pub(super) async fn infer(config: ConfigManager, output: Option<PathBuf>) -> Result<(), ToolError> {
    let workspace = Workspace::load(config).await?;
    let diff = workspace.diff();
    let inferred = infer_mapping(&diff.used_but_missing_from_reference, &diff.unused);

    for (old, new) in &inferred.mapping {
        tracing::info!("Proposed: {old} -> {new}");
    }
    for (old, candidates) in &inferred.ambiguous {
        tracing::warn!("Ambiguous, left out: {old} -> one of {}", candidates.join(", "));
    }
    for old in &inferred.unmatched {
        tracing::debug!("No candidate: {old}");
    }

    let path = output.unwrap_or_else(|| {
        workspace
            .config()
            .resolve(&workspace.settings().output.report_dir)
            .join(INFERRED_MAPPING_FILE)
    });
    let json = serde_json::to_string_pretty(&inferred.mapping).map_err(ReportError::from)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ReportError::Io { path: parent.to_path_buf(), source })?;
    }
    tokio::fs::write(&path, format!("{json}\n"))
        .await
        .map_err(|source| ReportError::Io { path: path.clone(), source })?;

    tracing::info!(
        proposed = inferred.mapping.len(),
        ambiguous = inferred.ambiguous.len(),
        unmatched = inferred.unmatched.len(),
        output = %workspace.relative(&path).display(),
        "Mapping proposal written; review it, then apply with `rewrite --mapping`"
    );
    Ok(())
}
