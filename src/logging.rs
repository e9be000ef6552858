//! Tracing subscriber setup.
//!
//! Progress and summaries go to stderr through `tracing`; `RUST_LOG`
//! overrides the default `info` filter. With `--log-file` the same events
//! are also appended, without ANSI colors, to that file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{
    RollingFileAppender,
    Rotation,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{
    EnvFilter,
    fmt,
};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global subscriber.
///
/// The returned guard flushes the log file when dropped and must be held for
/// the lifetime of the process. A log file that cannot be opened is reported
/// as a warning and logging continues on stderr only.
#[must_use]
pub fn init(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let Some(path) = log_file else {
        let _ = tracing_subscriber::registry().with(filter).with(stderr_layer).try_init();
        return None;
    };

    match file_appender(path) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_ansi(false).with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .try_init();
            Some(guard)
        }
        Err(error) => {
            let _ = tracing_subscriber::registry().with(filter).with(stderr_layer).try_init();
            tracing::warn!(
                path = %path.display(),
                "Cannot open log file, logging to stderr only: {error}"
            );
            None
        }
    }
}

/// Non-rotating appender writing to exactly `path`.
fn file_appender(path: &Path) -> Result<RollingFileAppender, String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| "path has no file name".to_string())?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    fn opens_appender_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keysync.log");

        let appender = file_appender(&path);

        assert!(appender.is_ok());
        assert!(path.exists());
    }

    #[rstest]
    fn rejects_path_without_file_name() {
        assert!(file_appender(Path::new("/")).is_err());
    }
}
