//! Command handlers.
//!
//! Each handler loads what it needs, computes in memory and ends with a
//! summary log restating the totals. Handlers that write files go through
//! [`crate::mutation::apply_plan`].

/// `add-missing`, `remove`, `remove-unused`, `rewrite`, `generate-schema`
mod edit;
/// `missing`, `debt`
mod gates;
/// `scan`, `report`, `infer-mapping`
mod inspect;

use std::path::{
    Path,
    PathBuf,
};

use indexmap::IndexMap;
use tracing::Instrument;

use crate::cli::{
    Cli,
    Command,
    WriteArgs,
};
use crate::config::{
    ConfigError,
    ConfigManager,
};
use crate::error::ToolError;
use crate::mutation::{
    ApplyOptions,
    ApplyOutcome,
    Confirmation,
    MutationError,
    WritePlan,
    apply_plan,
};
use crate::store::{
    TranslationTree,
    render_module,
};
use crate::workspace::Workspace;

/// Runs the parsed command line.
pub async fn run(cli: Cli) -> Result<(), ToolError> {
    let span = tracing::info_span!("i18n", command = cli.command.name());
    async move {
        let config = load_config(cli.workspace, cli.config.as_deref())?;
        dispatch(cli.command, config).await
    }
    .instrument(span)
    .await
}

/// Resolves the workspace root and loads its settings.
pub fn load_config(
    workspace: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<ConfigManager, ToolError> {
    let root = match workspace {
        Some(root) => root,
        None => std::env::current_dir().map_err(ConfigError::from)?,
    };
    let mut config = ConfigManager::new(root);
    config.load_settings(config_path)?;
    Ok(config)
}

/// Runs one command against loaded settings.
pub async fn dispatch(command: Command, config: ConfigManager) -> Result<(), ToolError> {
    match command {
        Command::Scan => inspect::scan(config).await,
        Command::Report { output } => inspect::report(config, output).await,
        Command::InferMapping { output } => inspect::infer(config, output).await,
        Command::Missing(args) => gates::missing(config, args).await,
        Command::Debt(args) => gates::debt(config, args).await,
        Command::AddMissing { input, write } => edit::add_missing(config, &input, write).await,
        Command::Remove { keys, file, write } => {
            edit::remove(config, keys, file.as_deref(), write).await
        }
        Command::RemoveUnused(write) => edit::remove_unused(config, write).await,
        Command::Rewrite { mapping, write } => edit::rewrite(config, &mapping, write).await,
        Command::GenerateSchema(write) => edit::generate_schema(config, write).await,
    }
}

/// Apply options for a workspace and the command's write flags.
fn apply_options(workspace: &Workspace, write: WriteArgs) -> ApplyOptions {
    let settings = workspace.settings();
    ApplyOptions {
        workspace_root: workspace.root().to_path_buf(),
        backup_root: workspace.config().resolve(&settings.output.backup_dir),
        confirmation: Confirmation::new(settings.safety.confirm_delay_secs, write.yes),
        dry_run: write.dry_run,
    }
}

/// Renders the modules of `languages` back to their files.
fn plan_modules<'a>(
    workspace: &Workspace,
    trees: &IndexMap<String, TranslationTree>,
    languages: impl IntoIterator<Item = &'a str>,
    plan: &mut WritePlan,
) -> Result<(), MutationError> {
    for language in languages {
        let Some(tree) = trees.get(language) else {
            continue;
        };
        let path = workspace.module_path(language);
        let contents = render_module(tree, &workspace.module_layout(language))
            .map_err(|source| MutationError::Render { path: path.clone(), source })?;
        let lost =
            workspace.module(language).map(|module| module.dropped.clone()).unwrap_or_default();
        plan.push_lossy(path, contents, lost);
    }
    Ok(())
}

/// Applies `plan` and logs what happened.
async fn apply(
    workspace: &Workspace,
    plan: WritePlan,
    summary: &str,
    write: WriteArgs,
) -> Result<ApplyOutcome, ToolError> {
    let outcome = apply_plan(plan, summary, &apply_options(workspace, write)).await?;
    match &outcome {
        ApplyOutcome::NoChanges => {}
        ApplyOutcome::DryRun { files } => {
            tracing::info!(files = files.len(), "Dry run complete: {summary}");
        }
        ApplyOutcome::Written { files, backup } => {
            tracing::info!(
                files = files.len(),
                restore_from = %workspace.relative(&backup.dir).display(),
                "Done: {summary}"
            );
        }
    }
    Ok(outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use std::fs;

    use rstest::*;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    fn loads_defaults_without_settings_file() {
        let temp_dir = TempDir::new().unwrap();

        let config = load_config(Some(temp_dir.path().to_path_buf()), None).unwrap();

        assert_eq!(config.workspace_root(), temp_dir.path());
        assert_eq!(config.get_settings().reference_language(), "en");
    }

    #[rstest]
    fn invalid_settings_are_a_precondition_failure() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".i18n-keysync.json"),
            r#"{"translationFiles": {"languages": []}}"#,
        )
        .unwrap();

        let error = load_config(Some(temp_dir.path().to_path_buf()), None).unwrap_err();

        assert_eq!(error.exit_code(), 2);
    }

    #[rstest]
    fn module_plan_lists_values_the_rewrite_drops() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let translations = root.join("src/lib/translations");
        fs::create_dir_all(&translations).unwrap();
        fs::write(
            root.join(".i18n-keysync.json"),
            r#"{"translationFiles": {"languages": ["en"]}}"#,
        )
        .unwrap();
        fs::write(
            translations.join("types.ts"),
            "export interface TranslationKeys {\n  common: {\n    save: string;\n  };\n}\n",
        )
        .unwrap();
        fs::write(
            translations.join("en.ts"),
            "export const en = { common: { save: 'Save' }, tags: ['a', 'b'] };\n",
        )
        .unwrap();
        let config = load_config(Some(root.to_path_buf()), None).unwrap();
        let workspace = tokio_test::block_on(Workspace::load(config)).unwrap();

        let mut plan = WritePlan::new("test");
        plan_modules(&workspace, &workspace.trees(), ["en"], &mut plan).unwrap();

        assert_eq!(plan.writes.len(), 1);
        assert_eq!(plan.writes[0].lost, vec!["tags".to_string()]);
        assert!(!plan.writes[0].contents.contains("tags"));
    }
}
