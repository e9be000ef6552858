//! Command-line interface.

use std::path::PathBuf;

use clap::{
    Args,
    Parser,
    Subcommand,
};

/// Reconcile translation keys between the schema, the language modules and
/// application source.
#[derive(Parser, Debug)]
#[command(name = "i18n-keysync", version, about)]
pub struct Cli {
    /// Workspace root (default: current directory).
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Settings file (default: <workspace>/.i18n-keysync.json).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also append logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scan the source tree and log used keys and usage counts.
    Scan,

    /// Write the coverage workbook, markdown report and JSON twin.
    Report {
        /// Output directory (default: output.reportDir).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Gate on used keys missing from translations.
    Missing(GateArgs),

    /// Gate on regex-detected i18n debt per file.
    Debt(GateArgs),

    /// Insert missing translations from a JSON request file.
    AddMissing {
        /// JSON list of `{ key, missingIn?, values }`.
        #[arg(long, short = 'i')]
        input: PathBuf,
        #[command(flatten)]
        write: WriteArgs,
    },

    /// Remove keys from every language module and the schema.
    Remove {
        /// Keys to remove.
        #[arg(long = "key", short = 'k', required_unless_present = "file")]
        keys: Vec<String>,
        /// File with one key per line.
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
        #[command(flatten)]
        write: WriteArgs,
    },

    /// Remove schema keys that nothing in the source tree uses.
    RemoveUnused(WriteArgs),

    /// Propose old -> new mappings for used keys the reference lacks.
    InferMapping {
        /// Where to write the proposal (default: <reportDir>/inferred-mapping.json).
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Rewrite key references in source using an old -> new mapping file.
    Rewrite {
        /// JSON object mapping old keys to new keys.
        #[arg(long, short = 'm')]
        mapping: PathBuf,
        #[command(flatten)]
        write: WriteArgs,
    },

    /// Regenerate the schema interface from the reference module.
    GenerateSchema(WriteArgs),
}

impl Command {
    /// Name used in the command span and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Report { .. } => "report",
            Self::Missing(_) => "missing",
            Self::Debt(_) => "debt",
            Self::AddMissing { .. } => "add-missing",
            Self::Remove { .. } => "remove",
            Self::RemoveUnused(_) => "remove-unused",
            Self::InferMapping { .. } => "infer-mapping",
            Self::Rewrite { .. } => "rewrite",
            Self::GenerateSchema(_) => "generate-schema",
        }
    }
}

/// Baseline gate mode flags.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateArgs {
    /// Fail when any metric exceeds the baseline.
    #[arg(long)]
    pub ci: bool,

    /// Overwrite the baseline with the current counts.
    #[arg(long)]
    pub update_baseline: bool,
}

/// Flags shared by every command that writes files.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteArgs {
    /// Skip the interactive confirmation (the delay still applies).
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Compute and log the changes without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}
