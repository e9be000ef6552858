//! Workspace settings: `.i18n-keysync.json` loading, validation and file matching.

/// Settings file loader
mod loader;
/// Configuration manager
mod manager;
/// Source file pattern matcher
mod matcher;
/// Configuration types and settings
mod types;

pub use manager::ConfigManager;
pub use matcher::{
    FileMatcher,
    MatcherError,
    PatternList,
};
pub use types::{
    ConfigError,
    DebtPattern,
    I18nSettings,
    OutputConfig,
    SafetyConfig,
    SchemaConfig,
    TranslationFilesConfig,
    UsageConfig,
    ValidationError,
};
