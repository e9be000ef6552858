//! Top-level error type and its process exit codes.

use std::io;

use thiserror::Error;

use crate::baseline::GateError;
use crate::config::ConfigError;
use crate::input::TranslationLoadError;
use crate::mutation::{
    MappingError,
    MutationError,
};
use crate::report::ReportError;
use crate::scanner::ScanError;
use crate::schema::SchemaError;

/// Exit code for a successful run.
pub const EXIT_OK: u8 = 0;
/// Exit code for failures and gate regressions.
pub const EXIT_FAILURE: u8 = 1;
/// Exit code for a missing precondition or a malformed override.
pub const EXIT_PRECONDITION: u8 = 2;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Translation(#[from] TranslationLoadError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Gate(#[from] GateError),
}

impl ToolError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Schema(SchemaError::NotFound(_)) => EXIT_PRECONDITION,
            Self::Translation(TranslationLoadError::Io { source, .. })
            | Self::Mapping(MappingError::Read { source, .. })
            | Self::Mutation(
                MutationError::ReadRequests { source, .. } | MutationError::ReadKeys { source, .. },
            )
                if source.kind() == io::ErrorKind::NotFound =>
            {
                EXIT_PRECONDITION
            }
            Self::Gate(error) => error.exit_code(),
            _ => EXIT_FAILURE,
        }
    }
}
