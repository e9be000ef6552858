//! The read phase: everything a command computes from, loaded up front.

use std::path::{
    Path,
    PathBuf,
};

use indexmap::IndexMap;

use crate::analysis::{
    DiffInput,
    DiffReport,
    LanguageKeys,
    compute_diff,
};
use crate::config::{
    ConfigManager,
    I18nSettings,
};
use crate::error::ToolError;
use crate::input::{
    ExportForm,
    TranslationFormat,
    TranslationModule,
    load_module,
};
use crate::scanner::{
    SourceText,
    UsageRules,
    UsageScanner,
    UsedKeySet,
};
use crate::schema::{
    LoadedSchema,
    load_schema,
};
use crate::store::{
    LeafMode,
    ModuleLayout,
    TranslationTree,
    flatten,
};

/// Immutable snapshot of the schema, every language module and the usage scan.
#[derive(Debug)]
pub struct Workspace {
    config: ConfigManager,
    scanner: UsageScanner,
    pub schema: LoadedSchema,
    /// One module per configured language, in configured order.
    pub modules: Vec<TranslationModule>,
    pub sources: Vec<SourceText>,
    pub used: UsedKeySet,
}

impl Workspace {
    /// Loads the schema and translation modules, then scans the source tree.
    pub async fn load(config: ConfigManager) -> Result<Self, ToolError> {
        let settings = config.get_settings();
        let schema = load_schema(&config.schema_path(), &settings.schema.type_name)?;

        let modules = settings
            .languages()
            .iter()
            .map(|language| load_module(&config.translation_path(language), language, language))
            .collect::<Result<Vec<_>, _>>()?;

        let scanner = UsageScanner::new(config.workspace_root().to_path_buf(), settings)?;
        let sources = scanner.read_sources().await;
        let used = scanner.scan_texts(&sources);

        tracing::info!(
            schema_keys = schema.keys.keys.len(),
            languages = modules.len(),
            files = used.files_scanned,
            used_keys = used.len(),
            "Workspace loaded"
        );

        Ok(Self { config, scanner, schema, modules, sources, used })
    }

    #[must_use]
    pub const fn settings(&self) -> &I18nSettings {
        self.config.get_settings()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.config.workspace_root()
    }

    #[must_use]
    pub const fn config(&self) -> &ConfigManager {
        &self.config
    }

    #[must_use]
    pub const fn rules(&self) -> &UsageRules {
        self.scanner.rules()
    }

    /// Path relative to the workspace root, for logs and reports.
    #[must_use]
    pub fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(self.root()).unwrap_or(path)
    }

    #[must_use]
    pub fn module(&self, language: &str) -> Option<&TranslationModule> {
        self.modules.iter().find(|module| module.language == language)
    }

    #[must_use]
    pub fn reference_module(&self) -> Option<&TranslationModule> {
        self.module(self.settings().reference_language())
    }

    /// Flattened keys of every module, numbers and booleans included.
    #[must_use]
    pub fn language_keys(&self) -> Vec<LanguageKeys> {
        self.modules
            .iter()
            .map(|module| LanguageKeys {
                language: module.language.clone(),
                values: flatten(&module.tree, LeafMode::Scalar),
                leaf_paths: module.leaf_paths.clone(),
            })
            .collect()
    }

    #[must_use]
    pub fn diff(&self) -> DiffReport {
        let languages = self.language_keys();
        compute_diff(DiffInput {
            schema: &self.schema.keys.keys,
            used: &self.used.key_set(),
            languages: &languages,
            reference_language: self.settings().reference_language(),
        })
    }

    /// Owned copies of every tree, keyed by language, for mutation.
    #[must_use]
    pub fn trees(&self) -> IndexMap<String, TranslationTree> {
        self.modules.iter().map(|module| (module.language.clone(), module.tree.clone())).collect()
    }

    #[must_use]
    pub fn module_path(&self, language: &str) -> PathBuf {
        self.module(language)
            .map_or_else(|| self.config.translation_path(language), |module| module.path.clone())
    }

    /// How the module of `language` is written back.
    #[must_use]
    pub fn module_layout(&self, language: &str) -> ModuleLayout {
        let format = self
            .module(language)
            .map(|module| module.format)
            .or_else(|| {
                TranslationFormat::from_extension(&self.settings().translation_files.extension)
            })
            .unwrap_or(TranslationFormat::TypeScript);
        let type_annotation = match format {
            TranslationFormat::TypeScript => self
                .settings()
                .translation_files
                .type_import
                .as_ref()
                .map(|import| (self.schema.type_name.clone(), import.clone())),
            TranslationFormat::JavaScript | TranslationFormat::Json => None,
        };
        let export = self
            .module(language)
            .and_then(|module| module.export.clone())
            .unwrap_or_else(|| ExportForm::Const(language.to_string()));
        ModuleLayout { format, export, type_annotation }
    }
}
