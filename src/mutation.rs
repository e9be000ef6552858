//! Changes to translation modules, the schema and application source.
//!
//! Every operation is computed in memory first. Writing goes through
//! [`apply_plan`], which backs up each target before anything is written.

/// Timestamped backups
mod backup;
/// Confirmation prompt and delay
mod confirm;
/// Missing-translation insertion
mod insert;
/// Key mappings
mod mapping;
/// Key removal
mod remove;
/// Source reference rewriting
mod rewrite;

use std::path::{
    Path,
    PathBuf,
};

pub use backup::{
    Backup,
    BackupError,
    backup_dir_name,
    create_backup,
};
use chrono::Utc;
pub use confirm::Confirmation;
pub use insert::{
    InsertOutcome,
    InsertRequest,
    Insertion,
    SkipReason,
    SkippedInsert,
    insert_missing,
    read_requests,
};
pub use mapping::{
    InferredMapping,
    KeyMapping,
    MappingError,
    infer_mapping,
};
pub use remove::remove_keys;
pub use rewrite::{
    FileRewrite,
    rewrite_sources,
    rewrite_text,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MutationError {
    #[error("Failed to read insert requests {}: {source}", path.display())]
    ReadRequests {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Insert requests in {} must be a JSON list of {{ key, missingIn?, values }}: {source}",
        path.display()
    )]
    ParseRequests {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read key list {}: {source}", path.display())]
    ReadKeys {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error("Failed to read the confirmation answer: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("Aborted: confirmation was not given")]
    Declined,

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file and the full contents it should end up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub path: PathBuf,
    pub contents: String,
    /// Paths of values in the current file that `contents` no longer holds
    /// because they could not be loaded.
    pub lost: Vec<String>,
}

/// Every write of one command, labelled for the backup directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritePlan {
    pub label: String,
    pub writes: Vec<PlannedWrite>,
}

impl WritePlan {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), writes: Vec::new() }
    }

    pub fn push(&mut self, path: PathBuf, contents: String) {
        self.push_lossy(path, contents, Vec::new());
    }

    /// Like [`Self::push`], for a module whose load dropped `lost`.
    pub fn push_lossy(&mut self, path: PathBuf, contents: String, lost: Vec<String>) {
        self.writes.push(PlannedWrite { path, contents, lost });
    }

    /// Drops writes that would leave a file byte-identical.
    #[must_use]
    pub fn changed_only(mut self) -> Self {
        self.writes.retain(|write| {
            !std::fs::read_to_string(&write.path).is_ok_and(|current| current == write.contents)
        });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// How a plan is applied.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub workspace_root: PathBuf,
    pub backup_root: PathBuf,
    pub confirmation: Confirmation,
    /// Compute and log only; no backup, no write.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    NoChanges,
    DryRun { files: Vec<PathBuf> },
    Written { files: Vec<PathBuf>, backup: Backup },
}

fn relative_to<'p>(root: &Path, path: &'p Path) -> &'p Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Backs up, confirms and writes a plan.
///
/// Order: prompt, backup, confirmation delay, write. A failed backup aborts
/// before anything is written.
pub async fn apply_plan(
    plan: WritePlan,
    summary: &str,
    options: &ApplyOptions,
) -> Result<ApplyOutcome, MutationError> {
    let plan = plan.changed_only();
    if plan.is_empty() {
        tracing::info!("Nothing to write; files already up to date");
        return Ok(ApplyOutcome::NoChanges);
    }

    let files: Vec<PathBuf> = plan.writes.iter().map(|write| write.path.clone()).collect();
    for write in &plan.writes {
        let file = relative_to(&options.workspace_root, &write.path);
        tracing::info!(file = %file.display(), "Planned write");
        if !write.lost.is_empty() {
            tracing::warn!(
                file = %file.display(),
                lost = write.lost.len(),
                "Rewriting drops values that could not be loaded: {}",
                write.lost.join(", ")
            );
        }
    }

    if options.dry_run {
        tracing::info!(files = files.len(), "Dry run: {summary}; nothing written");
        return Ok(ApplyOutcome::DryRun { files });
    }

    options.confirmation.ask(summary).await?;
    let backup = create_backup(
        &options.workspace_root,
        &options.backup_root,
        &plan.label,
        &files,
        Utc::now(),
    )?;
    options.confirmation.wait().await;

    for write in &plan.writes {
        if let Some(parent) = write.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| MutationError::Write { path: write.path.clone(), source })?;
        }
        tokio::fs::write(&write.path, &write.contents)
            .await
            .map_err(|source| MutationError::Write { path: write.path.clone(), source })?;
    }

    tracing::info!(
        files = files.len(),
        backup = %backup.dir.display(),
        "Wrote changes"
    );
    Ok(ApplyOutcome::Written { files, backup })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use std::fs;

    use rstest::*;
    use tempfile::TempDir;

    use super::*;

    fn options(root: &Path, dry_run: bool) -> ApplyOptions {
        ApplyOptions {
            workspace_root: root.to_path_buf(),
            backup_root: root.join("translation-backups"),
            confirmation: Confirmation::new(0, true),
            dry_run,
        }
    }

    #[rstest]
    fn backs_up_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let target = root.join("src/en.ts");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, "before").unwrap();
        let mut plan = WritePlan::new("test");
        plan.push(target.clone(), "after".to_string());

        let outcome =
            tokio_test::block_on(apply_plan(plan, "update en", &options(root, false))).unwrap();

        let ApplyOutcome::Written { backup, files } = outcome else {
            panic!("expected a write");
        };
        assert_eq!(files, vec![target.clone()]);
        assert_eq!(fs::read_to_string(&target).unwrap(), "after");
        assert_eq!(fs::read_to_string(backup.dir.join("src/en.ts")).unwrap(), "before");
    }

    #[rstest]
    fn dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let target = root.join("en.ts");
        fs::write(&target, "before").unwrap();
        let mut plan = WritePlan::new("test");
        plan.push(target.clone(), "after".to_string());

        let outcome =
            tokio_test::block_on(apply_plan(plan, "update en", &options(root, true))).unwrap();

        assert!(matches!(outcome, ApplyOutcome::DryRun { .. }));
        assert_eq!(fs::read_to_string(&target).unwrap(), "before");
        assert!(!root.join("translation-backups").exists());
    }

    #[rstest]
    fn identical_contents_are_not_rewritten() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let target = root.join("en.ts");
        fs::write(&target, "same").unwrap();
        let mut plan = WritePlan::new("test");
        plan.push(target, "same".to_string());

        let outcome =
            tokio_test::block_on(apply_plan(plan, "noop", &options(root, false))).unwrap();

        assert_eq!(outcome, ApplyOutcome::NoChanges);
    }

    #[rstest]
    fn failed_backup_leaves_targets_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let target = root.join("en.ts");
        fs::write(&target, "before").unwrap();
        fs::write(root.join("translation-backups"), "not a directory").unwrap();
        let mut plan = WritePlan::new("test");
        plan.push(target.clone(), "after".to_string());

        let result = tokio_test::block_on(apply_plan(plan, "update en", &options(root, false)));

        assert!(matches!(result, Err(MutationError::Backup(_))));
        assert_eq!(fs::read_to_string(&target).unwrap(), "before");
    }
}
