//! Static extraction of translation keys used by application source.

/// Key literal pattern rules
mod rules;
/// Source tree walking and reading
mod walker;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub(crate) use rules::LineIndex;
pub use rules::{
    KeyLiteral,
    KeyUsage,
    UsageKind,
    UsageRules,
};
pub use walker::{
    SourceText,
    find_source_files,
    read_sources,
};

use crate::config::{
    FileMatcher,
    I18nSettings,
    MatcherError,
};
use crate::types::{
    FlatKeySet,
    SourceLocation,
};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Matcher(#[from] MatcherError),

    #[error("Invalid usage pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Where and how a key was used.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UsageSite {
    pub location: SourceLocation,
    pub kind: UsageKind,
}

/// Keys found in source, each with the sites that produced it.
#[derive(Debug, Clone, Default)]
pub struct UsedKeySet {
    usages: BTreeMap<String, Vec<UsageSite>>,
    pub files_scanned: usize,
}

impl UsedKeySet {
    /// Lexically ordered set of used keys.
    #[must_use]
    pub fn key_set(&self) -> FlatKeySet {
        self.usages.keys().cloned().collect()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.usages.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.usages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }

    /// Usage sites of `key`, in file then line order.
    #[must_use]
    pub fn sites(&self, key: &str) -> &[UsageSite] {
        self.usages.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[UsageSite])> {
        self.usages.iter().map(|(key, sites)| (key.as_str(), sites.as_slice()))
    }

    pub(crate) fn record(&mut self, file: PathBuf, usage: KeyUsage) {
        let location = SourceLocation { file, line: usage.line };
        let site = UsageSite { location, kind: usage.kind };
        let sites = self.usages.entry(usage.key).or_default();
        if let Err(position) = sites.binary_search(&site) {
            sites.insert(position, site);
        }
    }
}

/// Walks the workspace and applies [`UsageRules`] to every source file.
#[derive(Debug, Clone)]
pub struct UsageScanner {
    matcher: FileMatcher,
    rules: UsageRules,
}

impl UsageScanner {
    pub fn new(workspace_root: PathBuf, settings: &I18nSettings) -> Result<Self, ScanError> {
        Ok(Self {
            matcher: FileMatcher::new(workspace_root, settings)?,
            rules: UsageRules::new(&settings.usage)?,
        })
    }

    #[must_use]
    pub const fn rules(&self) -> &UsageRules {
        &self.rules
    }

    /// Files matched by the include/exclude patterns.
    #[must_use]
    pub fn source_files(&self) -> Vec<PathBuf> {
        find_source_files(&self.matcher)
    }

    /// Reads every matched source file.
    pub async fn read_sources(&self) -> Vec<SourceText> {
        let files = self.source_files();
        tracing::debug!(files = files.len(), "Reading source files");
        read_sources(self.matcher.workspace_root(), &files).await
    }

    /// Walks and scans the workspace.
    pub async fn scan(&self) -> UsedKeySet {
        let sources = self.read_sources().await;
        let used = self.scan_texts(&sources);
        tracing::info!(
            files = used.files_scanned,
            keys = used.len(),
            "Scanned source files for key usages"
        );
        used
    }

    /// Applies the rules to already-read sources.
    #[must_use]
    pub fn scan_texts(&self, sources: &[SourceText]) -> UsedKeySet {
        let mut used = UsedKeySet::default();
        for source in sources {
            for usage in self.rules.extract(&source.text) {
                used.record(source.relative.clone(), usage);
            }
            used.files_scanned += 1;
        }
        used
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use std::fs;
    use std::path::Path;

    use googletest::prelude::*;
    use rstest::*;
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::source_text;

    #[fixture]
    fn scanner() -> UsageScanner {
        UsageScanner::new(PathBuf::from("/ws"), &I18nSettings::default()).unwrap()
    }

    #[rstest]
    fn merges_usages_across_files(scanner: UsageScanner) {
        let sources = [
            source_text("src/b.tsx", "t('common.save')\nt('common.save')"),
            source_text("src/a.tsx", "{ titleKey: 'dashboard' }\nt(`x.${y}`)"),
        ];

        let used = scanner.scan_texts(&sources);

        assert_eq!(used.files_scanned, 2);
        assert_eq!(
            used.key_set().into_iter().collect::<Vec<_>>(),
            vec!["common.save", "nav.dashboard"]
        );
        let lines: Vec<_> =
            used.sites("common.save").iter().map(|site| site.location.line).collect();
        assert_eq!(lines, vec![1, 2]);
        assert_eq!(used.sites("nav.dashboard")[0].location.file, Path::new("src/a.tsx"));
        assert_that!(used.sites("unknown.key"), is_empty());
    }

    #[rstest]
    fn same_site_is_recorded_once(scanner: UsageScanner) {
        let sources = [source_text("src/a.ts", "labelKey: 'a.b'")];

        let used = scanner.scan_texts(&sources);

        assert_that!(used.sites("a.b"), len(eq(1)));
    }

    #[rstest]
    fn scans_workspace_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/pages")).unwrap();
        fs::write(root.join("src/pages/Home.tsx"), "showToast.success('home.saved');").unwrap();
        fs::write(root.join("src/pages/Home.test.tsx"), "t('test.only')").unwrap();
        let scanner = UsageScanner::new(root.to_path_buf(), &I18nSettings::default()).unwrap();

        let used = tokio_test::block_on(scanner.scan());

        assert_eq!(used.files_scanned, 1);
        assert!(used.contains("home.saved"));
        assert!(!used.contains("test.only"));
    }

    #[rstest]
    fn invalid_include_glob_is_reported() {
        let mut settings = I18nSettings::default();
        settings.include_patterns = vec!["src/[".to_string()];
        let result = UsageScanner::new(PathBuf::from("/ws"), &settings);

        assert!(matches!(result, Err(ScanError::Matcher(_))));
    }
}
