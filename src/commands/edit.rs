use std::path::Path;

use super::{
    apply,
    plan_modules,
};
use crate::cli::WriteArgs;
use crate::config::{
    ConfigError,
    ConfigManager,
    ValidationError,
};
use crate::error::ToolError;
use crate::mutation::{
    KeyMapping,
    MutationError,
    WritePlan,
    insert_missing,
    read_requests,
    remove_keys,
    rewrite_sources,
};
use crate::schema::{
    SchemaError,
    remove_schema_keys,
    render_schema,
};
use crate::types::FlatKeySet;
use crate::workspace::Workspace;

/// Inserts translations from a request file without overwriting anything.
pub(super) async fn add_missing(
    config: ConfigManager,
    input: &Path,
    write: WriteArgs,
) -> Result<(), ToolError> {
    let requests = read_requests(input)?;
    let workspace = Workspace::load(config).await?;
    let reference = workspace.settings().reference_language();

    let mut trees = workspace.trees();
    let outcome = insert_missing(&mut trees, &requests, reference);
    for skipped in &outcome.skipped {
        tracing::warn!(
            key = %skipped.key,
            language = skipped.language.as_deref(),
            "Not inserted: {}",
            skipped.reason
        );
    }
    let fallbacks = outcome.inserted.iter().filter(|insertion| insertion.fallback_used).count();
    if fallbacks > 0 {
        tracing::warn!(
            fallbacks,
            "Blank values were filled with the {reference} text; translate them later"
        );
    }

    let touched = outcome.touched_languages();
    let mut plan = WritePlan::new("add-missing");
    plan_modules(&workspace, &trees, touched.iter().copied(), &mut plan)?;

    let summary = format!(
        "insert {} translation(s) for {} request(s) into {} language module(s)",
        outcome.inserted.len(),
        requests.len(),
        touched.len()
    );
    apply(&workspace, plan, &summary, write).await?;
    tracing::info!(
        requests = requests.len(),
        inserted = outcome.inserted.len(),
        fallbacks,
        skipped = outcome.skipped.len(),
        "Add-missing complete"
    );
    Ok(())
}

/// Removes explicitly named keys.
pub(super) async fn remove(
    config: ConfigManager,
    keys: Vec<String>,
    file: Option<&Path>,
    write: WriteArgs,
) -> Result<(), ToolError> {
    let mut targets: FlatKeySet = keys.into_iter().collect();
    if let Some(file) = file {
        targets.extend(read_key_list(file)?);
    }
    let workspace = Workspace::load(config).await?;
    remove_everywhere(&workspace, &targets, "remove", write).await
}

/// Removes every schema key nothing in the source tree uses.
pub(super) async fn remove_unused(
    config: ConfigManager,
    write: WriteArgs,
) -> Result<(), ToolError> {
    let workspace = Workspace::load(config).await?;
    let unused = workspace.diff().unused;
    tracing::info!(
        unused = unused.len(),
        "Keys built at runtime cannot be seen by the scan; review the list before confirming"
    );
    for key in &unused {
        tracing::debug!(key = %key, "Unused");
    }
    remove_everywhere(&workspace, &unused, "remove-unused", write).await
}

/// Rewrites key references in source files.
pub(super) async fn rewrite(
    config: ConfigManager,
    mapping_path: &Path,
    write: WriteArgs,
) -> Result<(), ToolError> {
    let mapping = KeyMapping::read(mapping_path)?;
    let workspace = Workspace::load(config).await?;

    let rewrites = rewrite_sources(&workspace.sources, workspace.rules(), &mapping);
    let mut plan = WritePlan::new("rewrite");
    let mut replacements = 0;
    for rewrite in rewrites {
        tracing::info!(
            file = %rewrite.relative.display(),
            replacements = rewrite.replacements,
            "Rewriting references"
        );
        replacements += rewrite.replacements;
        plan.push(rewrite.path, rewrite.text);
    }

    let files = plan.writes.len();
    let summary = format!("rewrite {replacements} reference(s) in {files} file(s)");
    apply(&workspace, plan, &summary, write).await?;
    tracing::info!(mappings = mapping.len(), files, replacements, "Rewrite complete");
    Ok(())
}

/// Regenerates the schema interface from the reference module.
pub(super) async fn generate_schema(
    config: ConfigManager,
    write: WriteArgs,
) -> Result<(), ToolError> {
    let workspace = Workspace::load(config).await?;
    let Some(reference) = workspace.reference_module() else {
        let language = workspace.settings().reference_language().to_string();
        return Err(ConfigError::ValidationErrors(vec![ValidationError::new(
            "translationFiles.referenceLanguage",
            format!("No module loaded for reference language '{language}'"),
        )])
        .into());
    };

    let text = render_schema(&reference.tree, &workspace.schema.type_name);
    let mut plan = WritePlan::new("generate-schema");
    plan.push(workspace.schema.path.clone(), text);

    let previous = workspace.schema.keys.keys.len();
    let summary = format!(
        "regenerate {} from the {} module",
        workspace.relative(&workspace.schema.path).display(),
        reference.language
    );
    apply(&workspace, plan, &summary, write).await?;
    tracing::info!(
        previous_keys = previous,
        reference_keys = workspace.diff().reference_key_count,
        "Schema generation complete"
    );
    Ok(())
}

/// Removes `keys` from every module and from the schema in one plan.
async fn remove_everywhere(
    workspace: &Workspace,
    keys: &FlatKeySet,
    label: &str,
    write: WriteArgs,
) -> Result<(), ToolError> {
    let mut trees = workspace.trees();
    let removed = remove_keys(&mut trees, keys);
    let schema_edit = remove_schema_keys(&workspace.schema.text, &workspace.schema.type_name, keys)
        .map_err(SchemaError::from)?;

    let mut plan = WritePlan::new(label);
    plan_modules(workspace, &trees, removed.keys().map(String::as_str), &mut plan)?;
    if !schema_edit.removed.is_empty() {
        plan.push(workspace.schema.path.clone(), schema_edit.text);
    }

    for (language, keys) in &removed {
        tracing::info!(language = %language, removed = keys.len(), "Removing from module");
    }
    let from_modules: usize = removed.values().map(Vec::len).sum();
    let summary = format!(
        "remove {} key(s): {from_modules} module entries across {} language(s), {} schema declaration(s)",
        keys.len(),
        removed.len(),
        schema_edit.removed.len()
    );
    apply(workspace, plan, &summary, write).await?;
    tracing::info!(
        requested = keys.len(),
        module_entries = from_modules,
        schema_declarations = schema_edit.removed.len(),
        "Removal complete"
    );
    Ok(())
}

/// One key per line; blank lines and `#` comments are skipped.
fn read_key_list(path: &Path) -> Result<Vec<String>, MutationError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| MutationError::ReadKeys { path: path.to_path_buf(), source })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    fn key_list_skips_blanks_and_comments() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("keys.txt");
        fs::write(&path, "# stale keys\ncommon.old\n\n  students.legacy  \n").unwrap();

        assert_eq!(read_key_list(&path).unwrap(), vec!["common.old", "students.legacy"]);
    }

    #[rstest]
    fn missing_key_list_is_a_precondition_failure() {
        let error: ToolError =
            read_key_list(Path::new("/nonexistent/keys.txt")).unwrap_err().into();

        assert_eq!(error.exit_code(), 2);
    }
}
