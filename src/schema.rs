//! The canonical key schema: extraction, editing and generation.

/// Leaf declaration removal
mod editor;
/// Schema generation from a tree
mod generator;
/// Structural key extraction
mod parser;

use std::path::{
    Path,
    PathBuf,
};

pub use editor::{
    SchemaEdit,
    remove_schema_keys,
};
pub use generator::render_schema;
pub use parser::{
    LeafDeclaration,
    SchemaKeys,
    SchemaWarning,
    extract_schema_keys,
};
use thiserror::Error;

use crate::input::SyntaxError;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Schema file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read schema file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Schema text together with the keys it declares.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub path: PathBuf,
    pub text: String,
    pub type_name: String,
    pub keys: SchemaKeys,
}

/// Reads the schema file and extracts the keys of `type_name`.
///
/// Extraction warnings are logged, never fatal.
pub fn load_schema(path: &Path, type_name: &str) -> Result<LoadedSchema, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SchemaError::NotFound(path.to_path_buf())
        } else {
            SchemaError::Io { path: path.to_path_buf(), source }
        }
    })?;

    let keys = extract_schema_keys(&text, type_name)?;
    for warning in &keys.warnings {
        tracing::warn!(file = %path.display(), "{warning}");
    }
    tracing::debug!(file = %path.display(), keys = keys.keys.len(), "Loaded schema");

    Ok(LoadedSchema { path: path.to_path_buf(), text, type_name: type_name.to_string(), keys })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use std::fs;

    use rstest::*;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    fn loads_schema_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("types.ts");
        fs::write(&path, "export interface Keys { common: { save: string } }").unwrap();

        let schema = load_schema(&path, "Keys").unwrap();

        assert_eq!(schema.keys.keys.iter().collect::<Vec<_>>(), vec!["common.save"]);
        assert_eq!(schema.type_name, "Keys");
    }

    #[rstest]
    fn missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_schema(&temp_dir.path().join("types.ts"), "Keys");

        assert!(matches!(result, Err(SchemaError::NotFound(_))));
    }
}
