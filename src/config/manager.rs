//! Configuration manager.

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    I18nSettings,
    loader,
};

/// Holds validated settings and the workspace they were loaded for.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    current_settings: I18nSettings,
    workspace_root: PathBuf,
}

impl ConfigManager {
    /// Creates a manager with default settings for `workspace_root`.
    #[must_use]
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { current_settings: I18nSettings::default(), workspace_root }
    }

    /// Loads and validates settings.
    ///
    /// Uses `config_path` when given, otherwise `.i18n-keysync.json` at the
    /// workspace root, otherwise the defaults.
    ///
    /// # Errors
    /// - File read error
    /// - JSON parse error
    /// - Validation error
    pub fn load_settings(&mut self, config_path: Option<&Path>) -> Result<(), ConfigError> {
        tracing::debug!(workspace = %self.workspace_root.display(), "Loading settings");

        let settings = match config_path {
            Some(path) => loader::load_from_file(path)?,
            None => loader::load_from_workspace(&self.workspace_root)?
                .map_or_else(I18nSettings::default, |ws| {
                    tracing::debug!("Loaded workspace settings: {:?}", ws);
                    ws
                }),
        };

        self.update_settings(settings)
    }

    /// Replaces the current settings after validating them.
    pub fn update_settings(&mut self, new_settings: I18nSettings) -> Result<(), ConfigError> {
        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &I18nSettings {
        &self.current_settings
    }

    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Resolves a settings path against the workspace root.
    #[must_use]
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.workspace_root.join(relative)
    }

    /// Path of the schema file.
    #[must_use]
    pub fn schema_path(&self) -> PathBuf {
        self.resolve(&self.current_settings.schema.file)
    }

    /// Path of the data module for `language`.
    #[must_use]
    pub fn translation_path(&self, language: &str) -> PathBuf {
        let files = &self.current_settings.translation_files;
        self.resolve(&files.directory).join(format!("{language}.{}", files.extension))
    }
}
