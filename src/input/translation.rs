//! Translation data module loading.
//!
//! A data module is parsed, never executed. TypeScript and JavaScript modules
//! contribute the object literal bound to the exported language constant
//! (`export const en: TranslationKeys = {...}`) or the default export; JSON
//! files contribute their top-level object. Values that cannot be represented
//! in a [`TranslationTree`] (arrays, functions, spreads, interpolated
//! templates) are dropped with a warning naming their path.

use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;
use tree_sitter::Node;

use super::source::{
    ProgrammingLanguage,
    SyntaxError,
};
use crate::store::{
    TranslationNode,
    TranslationTree,
};
use crate::types::join_key;

/// On-disk format of a data module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationFormat {
    TypeScript,
    JavaScript,
    Json,
}

impl TranslationFormat {
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "ts" => Some(Self::TypeScript),
            "js" => Some(Self::JavaScript),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|ext| ext.to_str()).and_then(Self::from_extension)
    }

    const fn language(self) -> ProgrammingLanguage {
        match self {
            Self::TypeScript => ProgrammingLanguage::TypeScript,
            Self::JavaScript => ProgrammingLanguage::JavaScript,
            Self::Json => ProgrammingLanguage::Json,
        }
    }
}

/// How a TS/JS module exposes its translation object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportForm {
    /// `export const <name> = {...}`
    Const(String),
    /// `export default {...}`
    Default,
    /// `const <name> = {...}; export default <name>;`
    DefaultBinding(String),
}

#[derive(Error, Debug)]
pub enum TranslationLoadError {
    #[error("Failed to read translation file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported translation file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("No exported object literal named '{export_name}' (or default export) found")]
    ExportNotFound { export_name: String },
}

/// Result of parsing one data module.
#[derive(Debug, Clone, Default)]
pub struct ParsedModule {
    pub tree: TranslationTree,
    /// Every leaf path in source order, repeated keys included.
    pub leaf_paths: Vec<String>,
    /// Dropped values and syntax problems.
    pub warnings: Vec<String>,
    /// Paths of values that were not loaded and would be lost on write.
    pub dropped: Vec<String>,
    /// `None` for JSON files.
    pub export: Option<ExportForm>,
}

/// A loaded per-language data module.
#[derive(Debug, Clone)]
pub struct TranslationModule {
    pub language: String,
    pub path: PathBuf,
    pub format: TranslationFormat,
    pub tree: TranslationTree,
    pub leaf_paths: Vec<String>,
    pub dropped: Vec<String>,
    pub export: Option<ExportForm>,
}

/// Reads and parses the data module at `path`.
///
/// `export_name` selects the exported constant in TS/JS modules.
pub fn load_module(
    path: &Path,
    language: &str,
    export_name: &str,
) -> Result<TranslationModule, TranslationLoadError> {
    let format = TranslationFormat::from_path(path)
        .ok_or_else(|| TranslationLoadError::UnsupportedFormat(path.to_path_buf()))?;
    let text = std::fs::read_to_string(path)
        .map_err(|source| TranslationLoadError::Io { path: path.to_path_buf(), source })?;

    let parsed = parse_module(&text, format, export_name)?;
    for warning in &parsed.warnings {
        tracing::warn!(file = %path.display(), "{warning}");
    }
    tracing::debug!(
        file = %path.display(),
        leaves = parsed.leaf_paths.len(),
        "Loaded translation module"
    );

    Ok(TranslationModule {
        language: language.to_string(),
        path: path.to_path_buf(),
        format,
        tree: parsed.tree,
        leaf_paths: parsed.leaf_paths,
        dropped: parsed.dropped,
        export: parsed.export,
    })
}

/// Parses data module text.
pub fn parse_module(
    text: &str,
    format: TranslationFormat,
    export_name: &str,
) -> Result<ParsedModule, TranslationLoadError> {
    let syntax_tree = format.language().parse(text)?;
    let root = syntax_tree.root_node();
    let source = text.as_bytes();

    let (object, export) = match format {
        TranslationFormat::Json => {
            first_named_child(root).filter(|n| n.kind() == "object").map(|object| (object, None))
        }
        TranslationFormat::TypeScript | TranslationFormat::JavaScript => {
            find_exported_object(root, export_name, source)
                .map(|(object, form)| (object, Some(form)))
        }
    }
    .ok_or_else(|| TranslationLoadError::ExportNotFound { export_name: export_name.to_string() })?;

    let mut walker = ObjectWalker {
        source,
        leaf_paths: Vec::new(),
        warnings: Vec::new(),
        dropped: Vec::new(),
    };
    if root.has_error() {
        walker
            .warnings
            .push("file contains syntax errors; entries near them may be missing".into());
    }
    let tree = walker.walk_object(object, None);

    Ok(ParsedModule {
        tree,
        leaf_paths: walker.leaf_paths,
        warnings: walker.warnings,
        dropped: walker.dropped,
        export,
    })
}

fn first_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).find(|child| child.kind() != "comment")
}

/// Strips `( )`, `as T`, `satisfies T` and `!` wrappers.
fn unwrap_expression(mut node: Node<'_>) -> Node<'_> {
    while matches!(
        node.kind(),
        "parenthesized_expression"
            | "as_expression"
            | "satisfies_expression"
            | "non_null_expression"
    ) {
        let Some(inner) = first_named_child(node) else {
            break;
        };
        node = inner;
    }
    node
}

/// A top-level `const`/`let`/`var` binding.
#[derive(Debug, Clone, Copy)]
struct Declarator<'s, 't> {
    /// Bound name.
    name: &'s str,
    /// Initializer with wrappers stripped.
    value: Node<'t>,
    /// Declared inside an `export` statement.
    exported: bool,
}

/// Finds the object literal to load from a module's top-level statements,
/// and how the module exports it.
///
/// Preference: the declarator named `export_name`, then the default export
/// (directly or through an identifier), then the only object declarator.
/// A binding that is neither exported nor the default export is written
/// back as a named export.
fn find_exported_object<'t>(
    root: Node<'t>,
    export_name: &str,
    source: &[u8],
) -> Option<(Node<'t>, ExportForm)> {
    let mut declarators: Vec<Declarator<'_, 't>> = Vec::new();
    let mut default_export = None;

    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        match statement.kind() {
            "export_statement" => {
                if let Some(declaration) = statement.child_by_field_name("declaration") {
                    collect_declarators(declaration, source, true, &mut declarators);
                }
                if let Some(value) = statement.child_by_field_name("value") {
                    default_export = Some(unwrap_expression(value));
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                collect_declarators(statement, source, false, &mut declarators);
            }
            _ => {}
        }
    }

    let default_name = default_export
        .filter(|value| value.kind() == "identifier")
        .and_then(|value| value.utf8_text(source).ok());
    let form_of = |declarator: &Declarator<'_, '_>| {
        if !declarator.exported && default_name == Some(declarator.name) {
            ExportForm::DefaultBinding(declarator.name.to_string())
        } else {
            ExportForm::Const(declarator.name.to_string())
        }
    };
    let object_named = |name: &str| {
        declarators.iter().find(|d| d.name == name && d.value.kind() == "object")
    };

    if let Some(declarator) = object_named(export_name) {
        return Some((declarator.value, form_of(declarator)));
    }
    if let Some(value) = default_export.filter(|value| value.kind() == "object") {
        return Some((value, ExportForm::Default));
    }
    if let Some(declarator) = default_name.and_then(object_named) {
        return Some((declarator.value, form_of(declarator)));
    }

    let mut objects = declarators.iter().filter(|d| d.value.kind() == "object");
    match (objects.next(), objects.next()) {
        (Some(only), None) => Some((only.value, form_of(only))),
        _ => None,
    }
}

fn collect_declarators<'s, 't>(
    declaration: Node<'t>,
    source: &'s [u8],
    exported: bool,
    declarators: &mut Vec<Declarator<'s, 't>>,
) {
    let mut cursor = declaration.walk();
    for declarator in declaration.named_children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let name = declarator.child_by_field_name("name").and_then(|n| n.utf8_text(source).ok());
        let value = declarator.child_by_field_name("value").map(unwrap_expression);
        if let (Some(name), Some(value)) = (name, value) {
            declarators.push(Declarator { name, value, exported });
        }
    }
}

/// Builds a [`TranslationTree`] from an object literal node.
struct ObjectWalker<'s> {
    /// Module text.
    source: &'s [u8],
    /// Leaf paths in visit order.
    leaf_paths: Vec<String>,
    /// Dropped-value notes.
    warnings: Vec<String>,
    /// Paths of dropped values.
    dropped: Vec<String>,
}

impl ObjectWalker<'_> {
    fn walk_object(&mut self, node: Node<'_>, prefix: Option<&str>) -> TranslationTree {
        let mut tree = TranslationTree::new();
        let mut cursor = node.walk();
        for member in node.named_children(&mut cursor) {
            match member.kind() {
                "pair" => self.walk_pair(member, prefix, &mut tree),
                "comment" => {}
                other => self.drop_value(prefix.unwrap_or("<root>"), other),
            }
        }
        tree
    }

    fn walk_pair(&mut self, pair: Node<'_>, prefix: Option<&str>, tree: &mut TranslationTree) {
        let (Some(key_node), Some(value_node)) =
            (pair.child_by_field_name("key"), pair.child_by_field_name("value"))
        else {
            return;
        };

        let segment = match self.property_name(key_node) {
            Some(segment) if !segment.is_empty() => segment,
            _ => {
                self.drop_value(prefix.unwrap_or("<root>"), "computed or empty property name");
                return;
            }
        };

        let full_key = join_key(prefix, &segment);
        if let Some(node) = self.value(value_node, &full_key) {
            tree.insert(segment, node);
        }
    }

    fn property_name(&self, node: Node<'_>) -> Option<String> {
        let text = node.utf8_text(self.source).ok()?;
        match node.kind() {
            "property_identifier" | "number" => Some(text.to_string()),
            "string" => Some(decode_quoted(text)),
            _ => None,
        }
    }

    fn value(&mut self, node: Node<'_>, full_key: &str) -> Option<TranslationNode> {
        let node = unwrap_expression(node);
        let text = node.utf8_text(self.source).ok()?;

        let leaf = match node.kind() {
            "object" => {
                return Some(TranslationNode::Container(self.walk_object(node, Some(full_key))));
            }
            "string" => TranslationNode::Text(decode_quoted(text)),
            "template_string" => {
                let mut cursor = node.walk();
                if node.named_children(&mut cursor).any(|c| c.kind() == "template_substitution") {
                    self.drop_value(full_key, "interpolated template literal");
                    return None;
                }
                TranslationNode::Text(decode_quoted(text))
            }
            "number" => match text.parse::<serde_json::Number>() {
                Ok(number) => TranslationNode::Number(number),
                Err(_) => {
                    self.drop_value(full_key, "non-decimal number literal");
                    return None;
                }
            },
            "true" => TranslationNode::Bool(true),
            "false" => TranslationNode::Bool(false),
            other => {
                self.drop_value(full_key, other);
                return None;
            }
        };

        self.leaf_paths.push(full_key.to_string());
        Some(leaf)
    }

    fn drop_value(&mut self, path: &str, what: &str) {
        self.warnings.push(format!("{path}: dropped unsupported value ({what})"));
        self.dropped.push(path.to_string());
    }
}

/// Decodes a quoted JS/JSON literal (quotes included) into its string value.
pub(crate) fn decode_quoted(literal: &str) -> String {
    let mut chars = literal.chars();
    chars.next();
    chars.next_back();
    unescape(chars.as_str())
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('x') => {
                if let Some(decoded) = read_hex(&mut chars, 2).and_then(char::from_u32) {
                    out.push(decoded);
                }
            }
            Some('u') => {
                if let Some(decoded) = read_unicode_escape(&mut chars) {
                    out.push(decoded);
                }
            }
            // Line continuation.
            Some('\n' | '\u{2028}' | '\u{2029}') => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn read_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, digits: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars.next()?.to_digit(16)?;
        value = value * 16 + digit;
    }
    Some(value)
}

/// Decodes the part after `\u`: `XXXX`, a surrogate pair, or `{X...}`.
fn read_unicode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    if chars.next_if_eq(&'{').is_some() {
        let mut value = 0u32;
        while let Some(c) = chars.next() {
            if c == '}' {
                return char::from_u32(value);
            }
            value = value.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
        }
        return None;
    }

    let high = read_hex(chars, 4)?;
    if !(0xD800..=0xDBFF).contains(&high) {
        return char::from_u32(high);
    }

    let mut lookahead = chars.clone();
    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
        let low = read_hex(&mut lookahead, 4)?;
        if (0xDC00..=0xDFFF).contains(&low) {
            *chars = lookahead;
            return char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00));
        }
    }
    Some(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::TempDir;

    use super::*;
    use crate::store::{
        LeafMode,
        ModuleLayout,
        flatten,
        render_module,
    };
    use crate::types::Key;

    fn flat_keys(parsed: &ParsedModule) -> Vec<String> {
        flatten(&parsed.tree, LeafMode::Scalar).keys().cloned().collect()
    }

    #[googletest::test]
    fn parse_typed_export_const() {
        let text = r#"import type { TranslationKeys } from './types';

// Dari
export const fa: TranslationKeys = {
  common: {
    save: 'ذخیره',
    "cancel-action": "لغو",
  },
  nav: { dashboard: `داشبورد` },
  limits: { max: 30, strict: false },
};
"#;

        let parsed = parse_module(text, TranslationFormat::TypeScript, "fa").unwrap();

        expect_that!(
            flat_keys(&parsed),
            elements_are![
                eq("common.save"),
                eq("common.cancel-action"),
                eq("nav.dashboard"),
                eq("limits.max"),
                eq("limits.strict")
            ]
        );
        expect_that!(
            parsed.tree.get_text(&Key::parse("common.save").unwrap()),
            some(eq("ذخیره"))
        );
        expect_that!(parsed.warnings, is_empty());
    }

    #[googletest::test]
    fn parse_default_export_with_as_const() {
        let text = "export default { title: 'Hello' } as const;";

        let parsed = parse_module(text, TranslationFormat::TypeScript, "en").unwrap();

        expect_that!(flat_keys(&parsed), elements_are![eq("title")]);
        assert_eq!(parsed.export, Some(ExportForm::Default));
    }

    #[googletest::test]
    fn parse_default_export_through_identifier() {
        let text =
            "const messages = { a: { b: 'x' } };\nconst other = 5;\nexport default messages;";

        let parsed = parse_module(text, TranslationFormat::JavaScript, "en").unwrap();

        expect_that!(flat_keys(&parsed), elements_are![eq("a.b")]);
        assert_eq!(parsed.export, Some(ExportForm::DefaultBinding("messages".to_string())));
    }

    #[googletest::test]
    fn parse_drops_unrepresentable_values() {
        let text = r"export const en = {
  list: ['a', 'b'],
  greet: (name) => `Hi ${name}`,
  dynamic: `Hi ${user}`,
  ...shared,
  kept: 'yes',
};";

        let parsed = parse_module(text, TranslationFormat::TypeScript, "en").unwrap();

        expect_that!(flat_keys(&parsed), elements_are![eq("kept")]);
        expect_that!(parsed.warnings, len(eq(4)));
        expect_that!(parsed.warnings, contains(contains_substring("list")));
        expect_that!(parsed.warnings, contains(contains_substring("dynamic")));
        expect_that!(
            parsed.dropped,
            elements_are![eq("list"), eq("greet"), eq("dynamic"), eq("<root>")]
        );
    }

    #[googletest::test]
    fn parse_keeps_repeated_keys_in_leaf_paths() {
        let text = "export const en = { a: { b: 'first', c: 'c' }, a: { b: 'second' } };";

        let parsed = parse_module(text, TranslationFormat::TypeScript, "en").unwrap();

        expect_that!(parsed.leaf_paths, elements_are![eq("a.b"), eq("a.c"), eq("a.b")]);
        expect_that!(
            parsed.tree.get_text(&Key::parse("a.b").unwrap()),
            some(eq("second"))
        );
    }

    #[rstest]
    #[case::newline(r"'a\nb'", "a\nb")]
    #[case::quote(r#""say \"hi\"""#, "say \"hi\"")]
    #[case::unicode(r"'\u0627'", "ا")]
    #[case::braced_unicode(r"'\u{1F600}'", "😀")]
    #[case::surrogate_pair(r"'\uD83D\uDE00'", "😀")]
    #[case::hex(r"'\x41'", "A")]
    #[case::escaped_backslash(r"'a\\b'", "a\\b")]
    fn decode_string_escapes(#[case] literal: &str, #[case] expected: &str) {
        assert_eq!(decode_quoted(literal), expected);
    }

    #[googletest::test]
    fn parse_json_file() {
        let text = r#"{ "common": { "save": "Save", "count": 2 }, "empty": {} }"#;

        let parsed = parse_module(text, TranslationFormat::Json, "en").unwrap();

        expect_that!(flat_keys(&parsed), elements_are![eq("common.save"), eq("common.count")]);
        assert_eq!(parsed.export, None);
    }

    #[rstest]
    fn parse_without_export_fails() {
        let text = "const a = 1;\nconst b = { x: 'y' };\nconst c = { z: 'w' };";

        let result = parse_module(text, TranslationFormat::TypeScript, "en");

        assert!(matches!(result, Err(TranslationLoadError::ExportNotFound { .. })));
    }

    #[rstest]
    fn rendered_module_parses_back_to_same_tree() {
        let text = "export const ar: TranslationKeys = {\n  common: { save: 'حفظ', note: 'a \\'quoted\\' word' },\n  n: 1.5,\n};";
        let parsed = parse_module(text, TranslationFormat::TypeScript, "ar").unwrap();
        let layout = ModuleLayout {
            format: TranslationFormat::TypeScript,
            export: parsed.export.clone().unwrap(),
            type_annotation: Some(("TranslationKeys".to_string(), "./types".to_string())),
        };

        let rendered = render_module(&parsed.tree, &layout).unwrap();
        let reparsed = parse_module(&rendered, TranslationFormat::TypeScript, "ar").unwrap();

        assert_eq!(reparsed.tree, parsed.tree);
        assert_eq!(reparsed.export, parsed.export);
    }

    #[rstest]
    #[case::default_object(
        "export default { nav: { home: 'Home' } } as const;",
        TranslationFormat::TypeScript
    )]
    #[case::default_binding(
        "const messages = { nav: { home: 'Home' } };\nexport default messages;",
        TranslationFormat::JavaScript
    )]
    #[case::other_name(
        "export const english = { nav: { home: 'Home' } };",
        TranslationFormat::TypeScript
    )]
    fn rendered_module_keeps_its_export(#[case] text: &str, #[case] format: TranslationFormat) {
        let parsed = parse_module(text, format, "en").unwrap();
        let layout = ModuleLayout {
            format,
            export: parsed.export.clone().unwrap(),
            type_annotation: Some(("TranslationKeys".to_string(), "./types".to_string())),
        };

        let rendered = render_module(&parsed.tree, &layout).unwrap();
        let reparsed = parse_module(&rendered, format, "en").unwrap();

        assert_eq!(reparsed.export, parsed.export);
        assert_eq!(reparsed.tree, parsed.tree);
    }

    #[rstest]
    fn load_module_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ps.ts");
        std::fs::write(&path, "export const ps = { nav: { home: 'کور' } };").unwrap();

        let module = load_module(&path, "ps", "ps").unwrap();

        assert_eq!(module.language, "ps");
        assert_eq!(module.format, TranslationFormat::TypeScript);
        assert_eq!(module.leaf_paths, vec!["nav.home".to_string()]);
    }

    #[rstest]
    fn load_module_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_module(&temp_dir.path().join("en.ts"), "en", "en");

        assert!(matches!(result, Err(TranslationLoadError::Io { .. })));
    }

    #[rstest]
    fn load_module_unsupported_extension() {
        let result = load_module(Path::new("en.yaml"), "en", "en");

        assert!(matches!(result, Err(TranslationLoadError::UnsupportedFormat(_))));
    }
}
