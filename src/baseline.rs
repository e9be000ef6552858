//! Ratchet gates over the missing-keys metrics and the i18n debt scanner.

/// Per-file regex debt scanner
mod debt;
/// Baseline persistence and comparison
mod gate;
/// Metrics derived from the diff
mod metrics;

pub use debt::DebtScanner;
pub use gate::{
    Baseline,
    FileCounts,
    Gate,
    GateError,
    GateMode,
    GateOutcome,
    MAX_MISSING_USED_ENV,
    Measurement,
    Regression,
    RegressionReport,
    compare,
    parse_ceiling_override,
};
pub use metrics::{
    DUPLICATE_KEYS,
    MISSING_USED_TOTAL,
    USED_MISSING_FROM_REFERENCE,
    missing_keys_measurement,
    missing_used_metric,
};
