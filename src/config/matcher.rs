//! Include/exclude globs deciding which source files the scanner reads.

use std::fmt;
use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};

use super::{
    I18nSettings,
    OutputConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternList {
    Include,
    Exclude,
}

impl fmt::Display for PatternList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Include => "include",
            Self::Exclude => "exclude",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid {list} pattern '{pattern}': {source}")]
    InvalidPattern {
        list: PatternList,
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build glob set: {0}")]
    Build(#[from] globset::Error),
}

/// Decides whether a file under the workspace is application source.
///
/// The report and backup directories are always excluded, whatever the
/// configured exclude patterns say, so generated output never feeds back
/// into the scan.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    workspace_root: PathBuf,
    include: GlobSet,
    exclude: GlobSet,
}

impl FileMatcher {
    pub fn new(workspace_root: PathBuf, settings: &I18nSettings) -> Result<Self, MatcherError> {
        let include = compile(&settings.include_patterns, PatternList::Include)?;

        let mut excluded = settings.exclude_patterns.clone();
        excluded.extend(output_patterns(&settings.output));
        let exclude = compile(&excluded, PatternList::Exclude)?;

        Ok(Self { workspace_root, include, exclude })
    }

    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Accepts absolute paths under the workspace root or workspace-relative
    /// paths. Absolute paths elsewhere never match.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let relative = if path.is_absolute() {
            match path.strip_prefix(&self.workspace_root) {
                Ok(relative) => relative,
                Err(_) => return false,
            }
        } else {
            path
        };
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }
}

/// Compiles one pattern list, naming the first invalid pattern.
fn compile(patterns: &[String], list: PatternList) -> Result<GlobSet, MatcherError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| MatcherError::InvalidPattern {
            list,
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// `<dir>/**` for the report and backup directories.
fn output_patterns(output: &OutputConfig) -> Vec<String> {
    [&output.report_dir, &output.backup_dir]
        .into_iter()
        .map(|dir| dir.trim_start_matches("./").trim_end_matches('/'))
        .filter(|dir| !dir.is_empty())
        .map(|dir| format!("{dir}/**"))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::*;

    use super::*;

    fn matcher(settings: &I18nSettings) -> FileMatcher {
        FileMatcher::new(PathBuf::from("/app"), settings).unwrap()
    }

    #[rstest]
    #[case::component("/app/src/pages/Students.tsx", true)]
    #[case::module("/app/src/lib/api.ts", true)]
    #[case::plain_js("/app/src/legacy.js", false)]
    #[case::outside_src("/app/scripts/seed.ts", false)]
    #[case::unit_test("/app/src/pages/Students.test.tsx", false)]
    #[case::test_dir("/app/src/__tests__/helpers.ts", false)]
    #[case::declaration("/app/src/env.d.ts", false)]
    #[case::generated("/app/src/api/client.generated.ts", false)]
    #[case::dependency("/app/src/node_modules/pkg/index.ts", false)]
    #[case::other_root("/elsewhere/src/index.ts", false)]
    #[case::relative("src/pages/Students.tsx", true)]
    fn default_patterns(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(matcher(&I18nSettings::default()).matches(Path::new(path)), expected);
    }

    #[rstest]
    fn custom_output_dirs_are_never_scanned() {
        let mut settings = I18nSettings::default();
        settings.output.report_dir = "./src/generated-reports/".to_string();
        settings.output.backup_dir = "src/.backups".to_string();
        let matcher = matcher(&settings);

        assert!(!matcher.matches(Path::new("src/generated-reports/notes.ts")));
        assert!(!matcher.matches(Path::new("src/.backups/backup-1/src/lib/translations/en.ts")));
        assert!(matcher.matches(Path::new("src/pages/Reports.tsx")));
    }

    #[rstest]
    #[case::include(&["src/**/*.{ts,tsx"], &[], PatternList::Include)]
    #[case::exclude(&["src/**/*.ts"], &["[broken"], PatternList::Exclude)]
    fn invalid_patterns_name_their_list(
        #[case] include: &[&str],
        #[case] exclude: &[&str],
        #[case] expected: PatternList,
    ) {
        let settings = I18nSettings {
            include_patterns: include.iter().map(|p| (*p).to_string()).collect(),
            exclude_patterns: exclude.iter().map(|p| (*p).to_string()).collect(),
            ..I18nSettings::default()
        };

        let error = FileMatcher::new(PathBuf::from("/app"), &settings).unwrap_err();

        assert!(matches!(error, MatcherError::InvalidPattern { list, .. } if list == expected));
    }
}
