use std::collections::HashSet;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "includePatterns[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Settings read from `.i18n-keysync.json` at the workspace root.
///
/// Every path is relative to the workspace root.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct I18nSettings {
    /// Source files scanned for key usages.
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,

    pub schema: SchemaConfig,
    pub translation_files: TranslationFilesConfig,
    pub usage: UsageConfig,
    pub output: OutputConfig,
    pub safety: SafetyConfig,

    /// Max offenders listed in gate failures and truncated report lists.
    pub sample_size: usize,

    /// Call shapes counted by the `debt` command.
    pub debt_patterns: Vec<DebtPattern>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaConfig {
    pub file: String,
    /// Name of the interface (or type alias) declaring the key shape.
    pub type_name: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            file: "src/lib/translations/types.ts".to_string(),
            type_name: "TranslationKeys".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationFilesConfig {
    pub directory: String,
    /// Languages in report column order. Each maps to `<directory>/<lang>.<extension>`.
    pub languages: Vec<String>,
    pub reference_language: String,
    /// One of `ts`, `js`, `json`.
    pub extension: String,
    /// Module the schema type is imported from when rendering TS modules.
    /// `None` renders an untyped `export const`.
    pub type_import: Option<String>,
}

impl Default for TranslationFilesConfig {
    fn default() -> Self {
        Self {
            directory: "src/lib/translations".to_string(),
            languages: ["en", "ps", "fa", "ar"].map(String::from).to_vec(),
            reference_language: "en".to_string(),
            extension: "ts".to_string(),
            type_import: Some("./types".to_string()),
        }
    }
}

/// Names the usage scanner recognizes in application source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageConfig {
    pub translation_functions: Vec<String>,
    pub notifier_objects: Vec<String>,
    pub notifier_methods: Vec<String>,
    pub key_properties: Vec<String>,
    pub navigation_property: String,
    pub navigation_prefix: String,
    pub validation_function: String,
    pub validation_namespace: String,
    /// Object whose method names map to `<validationNamespace>.<method>`.
    pub validation_helper_object: Option<String>,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            translation_functions: vec!["t".to_string()],
            notifier_objects: vec!["showToast".to_string()],
            notifier_methods: ["success", "error", "info", "warning", "loading"]
                .map(String::from)
                .to_vec(),
            key_properties: [
                "labelKey",
                "placeholderKey",
                "descriptionKey",
                "helpKey",
                "errorKey",
                "tooltipKey",
            ]
            .map(String::from)
            .to_vec(),
            navigation_property: "titleKey".to_string(),
            navigation_prefix: "nav".to_string(),
            validation_function: "getValidationMessage".to_string(),
            validation_namespace: "validation".to_string(),
            validation_helper_object: Some("validationMessages".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    pub report_dir: String,
    pub backup_dir: String,
    pub baseline_file: String,
    pub debt_baseline_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: "translation-reports".to_string(),
            backup_dir: "translation-backups".to_string(),
            baseline_file: ".i18n-baseline.json".to_string(),
            debt_baseline_file: ".i18n-debt-baseline.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafetyConfig {
    /// Pause before any destructive write.
    pub confirm_delay_secs: u64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self { confirm_delay_secs: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPattern {
    pub name: String,
    /// Regular expression matched against each scanned file.
    pub pattern: String,
}

impl DebtPattern {
    fn new(name: &str, pattern: &str) -> Self {
        Self { name: name.to_string(), pattern: pattern.to_string() }
    }
}

fn default_debt_patterns() -> Vec<DebtPattern> {
    vec![
        DebtPattern::new(
            "hardcodedToast",
            r#"\bshowToast\.(?:success|error|info|warning|loading)\(\s*(?:"[^".]*"|'[^'.]*')\s*[,)]"#,
        ),
        DebtPattern::new("hardcodedError", r#"\bthrow\s+new\s+Error\(\s*(?:"[^"]+"|'[^']+')"#),
        DebtPattern::new("dynamicKey", r"\bt\(\s*`[^`]*\$\{"),
    ]
}

impl I18nSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern or regular expression
    /// - Inconsistent language list
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.include_patterns.is_empty() {
            errors.push(ValidationError::new(
                "includePatterns",
                "At least one pattern is required. Example: [\"src/**/*.{ts,tsx}\"]",
            ));
        }

        for (index, pattern) in self.include_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("includePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        for (index, pattern) in self.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if self.schema.file.is_empty() {
            errors.push(ValidationError::new("schema.file", "The schema path cannot be empty"));
        }
        if self.schema.type_name.is_empty() {
            errors.push(ValidationError::new(
                "schema.typeName",
                "The type name cannot be empty. Example: \"TranslationKeys\"",
            ));
        }

        self.validate_translation_files(&mut errors);
        self.validate_usage(&mut errors);

        if self.sample_size == 0 {
            errors.push(ValidationError::new("sampleSize", "Must be at least 1"));
        }

        for (index, debt) in self.debt_patterns.iter().enumerate() {
            if debt.name.is_empty() {
                errors.push(ValidationError::new(
                    format!("debtPatterns[{index}].name"),
                    "The name cannot be empty",
                ));
            }
            if let Err(e) = regex::Regex::new(&debt.pattern) {
                errors.push(ValidationError::new(
                    format!("debtPatterns[{index}].pattern"),
                    format!("Invalid regular expression: {e}"),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Language list checks.
    fn validate_translation_files(&self, errors: &mut Vec<ValidationError>) {
        let files = &self.translation_files;

        if files.directory.is_empty() {
            errors.push(ValidationError::new(
                "translationFiles.directory",
                "The directory cannot be empty. Example: \"src/lib/translations\"",
            ));
        }

        if !matches!(files.extension.as_str(), "ts" | "js" | "json") {
            errors.push(ValidationError::new(
                "translationFiles.extension",
                format!(
                    "Unsupported extension '{}'. Use \"ts\", \"js\" or \"json\"",
                    files.extension
                ),
            ));
        }

        if files.languages.is_empty() {
            errors.push(ValidationError::new(
                "translationFiles.languages",
                "At least one language is required",
            ));
        }

        let mut seen = HashSet::new();
        for (index, language) in files.languages.iter().enumerate() {
            if language.is_empty()
                || !language.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                errors.push(ValidationError::new(
                    format!("translationFiles.languages[{index}]"),
                    format!("Invalid language code '{language}'"),
                ));
            }
            if !seen.insert(language.as_str()) {
                errors.push(ValidationError::new(
                    format!("translationFiles.languages[{index}]"),
                    format!("Duplicate language '{language}'"),
                ));
            }
        }

        if !files.languages.contains(&files.reference_language) {
            errors.push(ValidationError::new(
                "translationFiles.referenceLanguage",
                format!(
                    "Reference language '{}' is not listed in translationFiles.languages",
                    files.reference_language
                ),
            ));
        }
    }

    /// Usage-scanner names must be non-empty.
    fn validate_usage(&self, errors: &mut Vec<ValidationError>) {
        let usage = &self.usage;
        let lists = [
            ("usage.translationFunctions", &usage.translation_functions),
            ("usage.notifierObjects", &usage.notifier_objects),
            ("usage.notifierMethods", &usage.notifier_methods),
            ("usage.keyProperties", &usage.key_properties),
        ];
        for (path, names) in lists {
            for (index, name) in names.iter().enumerate() {
                if name.trim().is_empty() {
                    errors.push(ValidationError::new(
                        format!("{path}[{index}]"),
                        "Names cannot be empty",
                    ));
                }
            }
        }

        let singles = [
            ("usage.navigationProperty", &usage.navigation_property),
            ("usage.navigationPrefix", &usage.navigation_prefix),
            ("usage.validationFunction", &usage.validation_function),
            ("usage.validationNamespace", &usage.validation_namespace),
        ];
        for (path, name) in singles {
            if name.trim().is_empty() {
                errors.push(ValidationError::new(path, "The value cannot be empty"));
            }
        }
    }

    #[must_use]
    pub fn reference_language(&self) -> &str {
        &self.translation_files.reference_language
    }

    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.translation_files.languages
    }
}

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            include_patterns: vec!["src/**/*.{ts,tsx}".to_string()],
            exclude_patterns: [
                "**/node_modules/**",
                "**/dist/**",
                "**/build/**",
                "**/.next/**",
                "**/coverage/**",
                "**/.vite/**",
                "**/translation-reports/**",
                "**/translation-backups/**",
                "**/__tests__/**",
                "**/*.test.*",
                "**/*.spec.*",
                "**/*.generated.*",
                "**/*.d.ts",
            ]
            .map(String::from)
            .to_vec(),
            schema: SchemaConfig::default(),
            translation_files: TranslationFilesConfig::default(),
            usage: UsageConfig::default(),
            output: OutputConfig::default(),
            safety: SafetyConfig::default(),
            sample_size: 50,
            debt_patterns: default_debt_patterns(),
        }
    }
}
