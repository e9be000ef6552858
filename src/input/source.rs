//! Source languages and the shared tree-sitter entry point.

use std::path::Path;

use thiserror::Error;

/// Errors raised while handing text to tree-sitter.
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// Error when failing to set the language for the parser
    #[error("Failed to set language for parser: {0}")]
    LanguageSetup(#[from] tree_sitter::LanguageError),
    /// Error when the parser produced no tree
    #[error("Failed to parse source code")]
    ParseFailed,
}

/// Supported programming languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgrammingLanguage {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
    Json,
}

impl ProgrammingLanguage {
    /// Infers the programming language from file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("tsx") => Some(Self::Tsx),
            Some("ts" | "mts" | "cts") => Some(Self::TypeScript),
            Some("jsx") => Some(Self::Jsx),
            Some("js" | "mjs" | "cjs") => Some(Self::JavaScript),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }

    #[must_use]
    pub fn tree_sitter_language(&self) -> tree_sitter::Language {
        match self {
            Self::JavaScript | Self::Jsx => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Json => tree_sitter_json::LANGUAGE.into(),
        }
    }

    /// Parses `text` into a syntax tree.
    pub fn parse(self, text: &str) -> Result<tree_sitter::Tree, SyntaxError> {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&self.tree_sitter_language())?;
        parser.parse(text, None).ok_or(SyntaxError::ParseFailed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::tsx("file.tsx", Some(ProgrammingLanguage::Tsx))]
    #[case::ts("file.ts", Some(ProgrammingLanguage::TypeScript))]
    #[case::jsx("file.jsx", Some(ProgrammingLanguage::Jsx))]
    #[case::js("file.js", Some(ProgrammingLanguage::JavaScript))]
    #[case::mjs("file.mjs", Some(ProgrammingLanguage::JavaScript))]
    #[case::multiple_dots("file.config.ts", Some(ProgrammingLanguage::TypeScript))]
    #[case::json("file.json", Some(ProgrammingLanguage::Json))]
    #[case::no_ext("file", None)]
    #[case::unknown_ext("file.txt", None)]
    fn test_from_path(#[case] path: &str, #[case] expected: Option<ProgrammingLanguage>) {
        let lang = ProgrammingLanguage::from_path(Path::new(path));
        assert_eq!(lang, expected);
    }

    #[rstest]
    #[case::typescript(ProgrammingLanguage::TypeScript, "const a: number = 1;")]
    #[case::javascript(ProgrammingLanguage::JavaScript, "const a = 1;")]
    #[case::json(ProgrammingLanguage::Json, r#"{"a": 1}"#)]
    fn parse_produces_error_free_tree(#[case] language: ProgrammingLanguage, #[case] text: &str) {
        let tree = language.parse(text).unwrap();

        assert!(!tree.root_node().has_error());
    }
}
