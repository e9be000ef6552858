//! Settings file loading.

use std::path::Path;

use super::{
    ConfigError,
    I18nSettings,
};

/// Settings file name looked up at the workspace root.
pub(super) const CONFIG_FILE_NAME: &str = ".i18n-keysync.json";

/// Loads `.i18n-keysync.json` from the workspace root.
///
/// # Returns
/// - `Ok(Some(settings))`: file found and parsed
/// - `Ok(None)`: no settings file
///
/// # Errors
/// - File read error
/// - JSON parse error
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<I18nSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    load_from_file(&config_path).map(Some)
}

/// Loads settings from an explicit path. A missing file is an error here.
pub(super) fn load_from_file(config_path: &Path) -> Result<I18nSettings, ConfigError> {
    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(config_path)?;
    let settings: I18nSettings = serde_json::from_str(&content)?;

    Ok(settings)
}
