//! Differences between the schema, the source usages and each language.

/// Duplicate and untranslated-value checks
mod checks;
/// Set algebra
mod diff;
/// Namespace aggregation
mod rollup;
/// Per-key status and priority
mod status;

pub use checks::{
    find_duplicates,
    looks_untranslated,
    suspect_untranslated,
};
pub use diff::{
    DiffInput,
    DiffReport,
    LanguageKeys,
    compute_diff,
};
pub use rollup::{
    NamespaceSummary,
    summarize_namespaces,
};
pub use status::{
    KeyStatus,
    Priority,
};
