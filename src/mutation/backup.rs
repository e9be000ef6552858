//! Verbatim copies of files about to be overwritten.

use std::path::{
    Path,
    PathBuf,
};

use chrono::{
    DateTime,
    Utc,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Failed to create backup directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to back up {}: {source}", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A completed backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub dir: PathBuf,
    /// Workspace-relative paths of the copied files.
    pub files: Vec<PathBuf>,
}

/// Directory name for a backup taken at `now`.
#[must_use]
pub fn backup_dir_name(now: DateTime<Utc>, label: &str) -> String {
    format!("backup-{}-{label}", now.format("%Y%m%dT%H%M%SZ"))
}

/// Copies every existing file in `files` under a fresh timestamped directory
/// in `backup_root`, preserving paths relative to `workspace_root`.
///
/// Files that do not exist yet have nothing to preserve and are skipped.
/// Any copy failure aborts the backup.
pub fn create_backup(
    workspace_root: &Path,
    backup_root: &Path,
    label: &str,
    files: &[PathBuf],
    now: DateTime<Utc>,
) -> Result<Backup, BackupError> {
    let base = backup_root.join(backup_dir_name(now, label));
    let mut dir = base.clone();
    let mut attempt = 1;
    while dir.exists() {
        attempt += 1;
        dir = PathBuf::from(format!("{}-{attempt}", base.display()));
    }
    std::fs::create_dir_all(&dir)
        .map_err(|source| BackupError::CreateDir { path: dir.clone(), source })?;

    let mut copied = Vec::new();
    for file in files {
        if !file.exists() {
            tracing::debug!(file = %file.display(), "Nothing to back up for new file");
            continue;
        }
        let relative = file.strip_prefix(workspace_root).map_or_else(
            |_| PathBuf::from(file.file_name().unwrap_or_default()),
            Path::to_path_buf,
        );
        let target = dir.join(&relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| BackupError::CreateDir { path: parent.to_path_buf(), source })?;
        }
        std::fs::copy(file, &target)
            .map_err(|source| BackupError::Copy { path: file.clone(), source })?;
        copied.push(relative);
    }

    tracing::info!(
        backup = %dir.display(),
        files = copied.len(),
        "Backup created; to restore, copy its contents back into {}",
        workspace_root.display()
    );
    Ok(Backup { dir, files: copied })
}
