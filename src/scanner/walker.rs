//! Source tree traversal and concurrent file reading.

use std::path::{
    Path,
    PathBuf,
};

use ignore::WalkBuilder;

use crate::config::FileMatcher;

/// A source file read into memory.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub path: PathBuf,
    /// Path relative to the workspace root.
    pub relative: PathBuf,
    pub text: String,
}

/// Lists matching source files under the workspace root, sorted.
///
/// Honors `.gitignore`; hidden directories are walked and left to the
/// exclude patterns.
#[must_use]
pub fn find_source_files(matcher: &FileMatcher) -> Vec<PathBuf> {
    let workspace_path = matcher.workspace_root();
    let mut found_files = Vec::new();

    for result in WalkBuilder::new(workspace_path)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        if matcher.matches(entry.path()) {
            found_files.push(entry.path().to_path_buf());
        }
    }

    found_files.sort();
    found_files
}

/// Reads every file concurrently. Unreadable files are skipped with a warning.
pub async fn read_sources(workspace_path: &Path, files: &[PathBuf]) -> Vec<SourceText> {
    let reads = files.iter().map(|path| read_source(workspace_path, path));

    futures::future::join_all(reads).await.into_iter().flatten().collect()
}

async fn read_source(workspace_path: &Path, path: &Path) -> Option<SourceText> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            let relative = path.strip_prefix(workspace_path).unwrap_or(path).to_path_buf();
            Some(SourceText { path: path.to_path_buf(), relative, text })
        }
        Err(e) => {
            tracing::warn!("Failed to read file {:?}: {}", path, e);
            None
        }
    }
}
