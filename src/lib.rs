//! i18n-keysync
//!
//! Reconciles translation keys between a TypeScript schema interface,
//! per-language translation modules and the application source that uses
//! them: coverage reports, baseline gates and backed-up bulk edits.

pub mod analysis;
pub mod baseline;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod mutation;
pub mod report;
pub mod scanner;
pub mod schema;
pub mod store;
pub mod types;
pub mod workspace;

mod test_utils;
