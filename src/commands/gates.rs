use std::collections::BTreeMap;

use chrono::Utc;

use crate::baseline::{
    DebtScanner,
    Gate,
    GateMode,
    GateOutcome,
    MAX_MISSING_USED_ENV,
    MISSING_USED_TOTAL,
    Measurement,
    missing_keys_measurement,
    parse_ceiling_override,
};
use crate::cli::GateArgs;
use crate::config::ConfigManager;
use crate::error::ToolError;
use crate::scanner::{
    ScanError,
    UsageScanner,
};
use crate::workspace::Workspace;

/// Ratchet over used keys missing from translations.
pub(super) async fn missing(config: ConfigManager, args: GateArgs) -> Result<(), ToolError> {
    let override_value = std::env::var(MAX_MISSING_USED_ENV).ok();
    let ceiling = parse_ceiling_override(override_value.as_deref())?;

    let workspace = Workspace::load(config).await?;
    let settings = workspace.settings();
    let diff = workspace.diff();
    let measurement = missing_keys_measurement(&diff);

    let mut ceilings = BTreeMap::new();
    if let Some(ceiling) = ceiling {
        tracing::info!(
            ceiling,
            "{MAX_MISSING_USED_ENV} overrides the {MISSING_USED_TOTAL} allowance"
        );
        ceilings.insert(MISSING_USED_TOTAL.to_string(), ceiling);
    }

    let gate = Gate {
        mode: GateMode::from_flags(args.ci, args.update_baseline),
        baseline_path: workspace.config().resolve(&settings.output.baseline_file),
        sample_size: settings.sample_size,
        ceilings,
    };
    let outcome = gate.run(&measurement, Utc::now())?;

    if gate.mode == GateMode::Report {
        log_samples(&measurement, settings.sample_size);
    }
    tracing::info!(
        missing_used = diff.missing_used_total(),
        used_missing_from_reference = diff.used_but_missing_from_reference.len(),
        duplicates = diff.duplicate_total(),
        outcome = ?outcome,
        "Missing-keys check complete"
    );
    Ok(())
}

/// Ratchet over the regex debt patterns, per file.
pub(super) async fn debt(config: ConfigManager, args: GateArgs) -> Result<(), ToolError> {
    let settings = config.get_settings();
    let scanner = UsageScanner::new(config.workspace_root().to_path_buf(), settings)?;
    let debt = DebtScanner::new(&settings.debt_patterns).map_err(ScanError::from)?;

    let sources = scanner.read_sources().await;
    let measurement = debt.measure(&sources);

    let gate = Gate {
        mode: GateMode::from_flags(args.ci, args.update_baseline),
        baseline_path: config.resolve(&settings.output.debt_baseline_file),
        sample_size: settings.sample_size,
        ceilings: BTreeMap::new(),
    };
    let outcome = gate.run(&measurement, Utc::now())?;

    if gate.mode == GateMode::Report {
        log_samples(&measurement, settings.sample_size);
    }
    tracing::info!(
        files_scanned = sources.len(),
        files_with_debt = measurement.files.len(),
        total = measurement.metrics.values().sum::<usize>(),
        outcome = ?outcome,
        "Debt check complete"
    );
    Ok(())
}

/// Logs the first offenders of every non-zero metric.
fn log_samples(measurement: &Measurement, sample_size: usize) {
    for (metric, samples) in &measurement.samples {
        if samples.is_empty() {
            continue;
        }
        let shown: Vec<&str> = samples.iter().take(sample_size).map(String::as_str).collect();
        tracing::info!(metric = %metric, count = samples.len(), "{}", shown.join(", "));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use std::fs;

    use rstest::*;
    use tempfile::TempDir;

    use super::*;

    fn debt_workspace() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("src")).unwrap();
        fs::write(temp_dir.path().join("src/a.ts"), "showToast.error('Save failed');\n").unwrap();
        temp_dir
    }

    fn config(root: &TempDir) -> ConfigManager {
        let mut config = ConfigManager::new(root.path().to_path_buf());
        config.load_settings(None).unwrap();
        config
    }

    #[rstest]
    fn debt_ratchet_updates_then_enforces() {
        let root = debt_workspace();
        let update = GateArgs { ci: false, update_baseline: true };
        let enforce = GateArgs { ci: true, update_baseline: false };

        tokio_test::block_on(debt(config(&root), update)).unwrap();
        let first = tokio_test::block_on(debt(config(&root), enforce));
        fs::write(root.path().join("src/b.ts"), "throw new Error('Not found');\n").unwrap();
        let second = tokio_test::block_on(debt(config(&root), enforce));

        assert!(root.path().join(".i18n-debt-baseline.json").exists());
        assert!(first.is_ok());
        assert_eq!(second.unwrap_err().exit_code(), 1);
    }

    #[rstest]
    fn debt_enforce_without_baseline_exits_two() {
        let root = debt_workspace();
        let enforce = GateArgs { ci: true, update_baseline: false };

        let result = tokio_test::block_on(debt(config(&root), enforce));

        assert_eq!(result.unwrap_err().exit_code(), 2);
    }

    #[rstest]
    fn debt_report_mode_never_fails() {
        let root = debt_workspace();

        let result = tokio_test::block_on(debt(config(&root), GateArgs::default()));

        assert!(result.is_ok());
    }
}
