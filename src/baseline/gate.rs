//! Ratchet comparison against a persisted baseline.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::path::{
    Path,
    PathBuf,
};

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::error::{
    EXIT_FAILURE,
    EXIT_PRECONDITION,
};

/// Environment variable overriding the `missingUsedTotal` ceiling.
pub const MAX_MISSING_USED_ENV: &str = "I18N_MAX_MISSING_USED";

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Baseline {} does not exist; run with --update-baseline to create it", .0.display())]
    MissingBaseline(PathBuf),

    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidOverride { name: String, value: String },

    #[error("{0}")]
    Regressed(RegressionReport),

    #[error("Failed to read baseline {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Baseline {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write baseline {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GateError {
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::MissingBaseline(_) | Self::InvalidOverride { .. } => EXIT_PRECONDITION,
            Self::Regressed(_) | Self::Read { .. } | Self::Parse { .. } | Self::Write { .. } => {
                EXIT_FAILURE
            }
        }
    }
}

/// Counts per metric, and per file for file-level scanners.
pub type FileCounts = BTreeMap<String, BTreeMap<String, usize>>;

/// Persisted reference counts. Written only on explicit update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub generated_at: DateTime<Utc>,
    pub metrics: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub files: FileCounts,
}

impl Baseline {
    /// Reads the baseline; `None` when the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>, GateError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(GateError::Read { path: path.to_path_buf(), source }),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| GateError::Parse { path: path.to_path_buf(), source })
    }

    pub fn write(&self, path: &Path) -> Result<(), GateError> {
        let mut text = serde_json::to_string_pretty(self)
            .map_err(|source| GateError::Parse { path: path.to_path_buf(), source })?;
        text.push('\n');
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|source| GateError::Write { path: path.to_path_buf(), source })?;
        }
        std::fs::write(path, text)
            .map_err(|source| GateError::Write { path: path.to_path_buf(), source })
    }
}

/// Current counts plus example offenders per metric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Measurement {
    pub metrics: BTreeMap<String, usize>,
    pub files: FileCounts,
    /// Offending keys or files per metric, for failure messages.
    pub samples: BTreeMap<String, Vec<String>>,
    /// Metric quoted as the total; all metrics are summed when unset.
    pub headline: Option<String>,
}

impl Measurement {
    #[must_use]
    pub fn to_baseline(&self, generated_at: DateTime<Utc>) -> Baseline {
        Baseline { generated_at, metrics: self.metrics.clone(), files: self.files.clone() }
    }

    fn total(&self) -> usize {
        self.total_of(&self.metrics)
    }

    /// Headline total of `metrics`, which may come from a baseline.
    fn total_of(&self, metrics: &BTreeMap<String, usize>) -> usize {
        self.headline
            .as_ref()
            .map_or_else(|| metrics.values().sum(), |name| metrics.get(name).copied().unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// Measure and log.
    Report,
    /// Fail on any increase over the baseline.
    Enforce,
    /// Overwrite the baseline.
    Update,
}

impl GateMode {
    /// `--update-baseline` wins over `--ci`.
    #[must_use]
    pub const fn from_flags(ci: bool, update_baseline: bool) -> Self {
        match (ci, update_baseline) {
            (_, true) => Self::Update,
            (true, false) => Self::Enforce,
            (false, false) => Self::Report,
        }
    }
}

/// One count above what the baseline allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regression {
    pub metric: String,
    /// Set for file-level counts.
    pub file: Option<String>,
    pub current: usize,
    pub allowed: usize,
}

impl fmt::Display for Regression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => {
                write!(f, "{file} [{}]: {} > {}", self.metric, self.current, self.allowed)
            }
            None => write!(f, "{}: {} > {}", self.metric, self.current, self.allowed),
        }
    }
}

/// Failure details: bounded regression list, samples and totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegressionReport {
    pub baseline_path: PathBuf,
    pub regressions: Vec<Regression>,
    pub samples: BTreeMap<String, Vec<String>>,
    pub sample_size: usize,
    pub current_total: usize,
    pub baseline_total: usize,
}

impl fmt::Display for RegressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} regression(s) against {}:",
            self.regressions.len(),
            self.baseline_path.display()
        )?;
        for regression in self.regressions.iter().take(self.sample_size) {
            writeln!(f, "  {regression}")?;
        }
        if self.regressions.len() > self.sample_size {
            writeln!(f, "  ... and {} more", self.regressions.len() - self.sample_size)?;
        }
        for (metric, samples) in &self.samples {
            if samples.is_empty() {
                continue;
            }
            let shown: Vec<&str> =
                samples.iter().take(self.sample_size).map(String::as_str).collect();
            let mut line = format!("  {metric} sample: {}", shown.join(", "));
            if samples.len() > shown.len() {
                let _ = write!(line, " (+{} more)", samples.len() - shown.len());
            }
            writeln!(f, "{line}")?;
        }
        write!(f, "Totals: current {} vs baseline {}", self.current_total, self.baseline_total)
    }
}

/// Every metric and file count of `current` above its allowance.
///
/// A metric's allowance is its ceiling override when set, else its baseline
/// count; anything the baseline does not know is allowed zero.
#[must_use]
pub fn compare(
    current: &Measurement,
    baseline: &Baseline,
    ceilings: &BTreeMap<String, usize>,
) -> Vec<Regression> {
    let mut regressions = Vec::new();
    for (metric, &count) in &current.metrics {
        let allowed = ceilings
            .get(metric)
            .or_else(|| baseline.metrics.get(metric))
            .copied()
            .unwrap_or(0);
        if count > allowed {
            regressions.push(Regression {
                metric: metric.clone(),
                file: None,
                current: count,
                allowed,
            });
        }
    }
    for (file, counts) in &current.files {
        for (metric, &count) in counts {
            let allowed =
                baseline.files.get(file).and_then(|c| c.get(metric)).copied().unwrap_or(0);
            if count > allowed {
                regressions.push(Regression {
                    metric: metric.clone(),
                    file: Some(file.clone()),
                    current: count,
                    allowed,
                });
            }
        }
    }
    regressions
}

/// Parses the `missingUsedTotal` ceiling override.
pub fn parse_ceiling_override(raw: Option<&str>) -> Result<Option<usize>, GateError> {
    raw.map(|value| {
        value.trim().parse::<usize>().map_err(|_| GateError::InvalidOverride {
            name: MAX_MISSING_USED_ENV.to_string(),
            value: value.to_string(),
        })
    })
    .transpose()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Reported,
    Passed,
    Updated,
}

/// Baseline location and comparison settings for one gated command.
#[derive(Debug, Clone)]
pub struct Gate {
    pub mode: GateMode,
    pub baseline_path: PathBuf,
    pub sample_size: usize,
    pub ceilings: BTreeMap<String, usize>,
}

impl Gate {
    pub fn run(&self, current: &Measurement, now: DateTime<Utc>) -> Result<GateOutcome, GateError> {
        for (metric, count) in &current.metrics {
            tracing::info!(metric = %metric, count, "Measured");
        }

        match self.mode {
            GateMode::Report => Ok(GateOutcome::Reported),
            GateMode::Update => {
                current.to_baseline(now).write(&self.baseline_path)?;
                tracing::info!(
                    baseline = %self.baseline_path.display(),
                    total = current.total(),
                    "Baseline updated"
                );
                Ok(GateOutcome::Updated)
            }
            GateMode::Enforce => {
                let baseline = Baseline::read(&self.baseline_path)?
                    .ok_or_else(|| GateError::MissingBaseline(self.baseline_path.clone()))?;
                let regressions = compare(current, &baseline, &self.ceilings);
                if regressions.is_empty() {
                    tracing::info!(
                        baseline = %self.baseline_path.display(),
                        current = current.total(),
                        allowed = current.total_of(&baseline.metrics),
                        "No regressions against baseline"
                    );
                    return Ok(GateOutcome::Passed);
                }

                let samples = regressions
                    .iter()
                    .filter(|r| r.file.is_none())
                    .filter_map(|r| {
                        current.samples.get(&r.metric).map(|s| (r.metric.clone(), s.clone()))
                    })
                    .collect();
                Err(GateError::Regressed(RegressionReport {
                    baseline_path: self.baseline_path.clone(),
                    regressions,
                    samples,
                    sample_size: self.sample_size,
                    current_total: current.total(),
                    baseline_total: current.total_of(&baseline.metrics),
                }))
            }
        }
    }
}
