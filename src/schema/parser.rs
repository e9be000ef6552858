//! Key extraction from the schema type declaration.

use std::fmt;

use tree_sitter::Node;

use crate::input::translation::decode_quoted;
use crate::input::{
    ProgrammingLanguage,
    SyntaxError,
};
use crate::types::{
    FlatKeySet,
    KEY_SEPARATOR,
};

/// Something about the schema that makes the extracted key set suspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaWarning {
    /// 1-indexed line, when known.
    pub line: Option<usize>,
    pub message: String,
}

impl SchemaWarning {
    fn at(node: Node<'_>, message: impl Into<String>) -> Self {
        Self { line: Some(node.start_position().row + 1), message: message.into() }
    }
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A leaf property declaration and its byte span in the schema text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafDeclaration {
    pub key: String,
    pub start_byte: usize,
    pub end_byte: usize,
}

/// Output of [`extract_schema_keys`].
#[derive(Debug, Clone, Default)]
pub struct SchemaKeys {
    pub keys: FlatKeySet,
    pub declarations: Vec<LeafDeclaration>,
    pub warnings: Vec<SchemaWarning>,
}

/// Extracts the flat key set declared by `type_name`.
///
/// Walks `interface <type_name> { ... }` (every merged declaration) or
/// `type <type_name> = { ... }`. A property typed with an object type is a
/// container; any other typed property is a leaf. A quoted leaf name that
/// already contains a dot is taken verbatim as a full key.
pub fn extract_schema_keys(text: &str, type_name: &str) -> Result<SchemaKeys, SyntaxError> {
    let tree = ProgrammingLanguage::TypeScript.parse(text)?;
    let source = text.as_bytes();
    let mut result = SchemaKeys::default();

    let root = tree.root_node();
    if let Some(row) = first_error_row(root) {
        result.warnings.push(SchemaWarning {
            line: Some(row + 1),
            message: "syntax error in the schema file; keys near it may be missing".to_string(),
        });
    }

    let bodies = find_type_bodies(root, type_name, source);
    if bodies.is_empty() {
        result.warnings.push(SchemaWarning {
            line: None,
            message: format!("type declaration `{type_name}` not found; schema key set is empty"),
        });
        return Ok(result);
    }

    let mut walker = SchemaWalker { source, stack: Vec::new(), result };
    for body in bodies {
        walker.walk(body);
    }

    Ok(walker.result)
}

/// Object-type bodies of every declaration named `type_name`.
pub(super) fn find_type_bodies<'t>(
    root: Node<'t>,
    type_name: &str,
    source: &[u8],
) -> Vec<Node<'t>> {
    let mut bodies = Vec::new();
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        let declaration = if statement.kind() == "export_statement" {
            statement.child_by_field_name("declaration")
        } else {
            Some(statement)
        };
        let Some(declaration) = declaration else {
            continue;
        };

        let body_field = match declaration.kind() {
            "interface_declaration" => "body",
            "type_alias_declaration" => "value",
            _ => continue,
        };
        let name = declaration.child_by_field_name("name").and_then(|n| n.utf8_text(source).ok());
        if name != Some(type_name) {
            continue;
        }
        if let Some(body) = declaration.child_by_field_name(body_field)
            && matches!(body.kind(), "interface_body" | "object_type")
        {
            bodies.push(body);
        }
    }
    bodies
}

fn first_error_row(node: Node<'_>) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_row)
}

/// Property name text of a `property_signature`, and whether it was quoted.
pub(super) fn property_name(member: Node<'_>, source: &[u8]) -> Option<(String, bool)> {
    let name_node = member.child_by_field_name("name")?;
    let text = name_node.utf8_text(source).ok()?;
    match name_node.kind() {
        "property_identifier" | "number" => Some((text.to_string(), false)),
        "string" => Some((decode_quoted(text), true)),
        _ => None,
    }
}

/// The type node of a `property_signature`'s annotation.
pub(super) fn annotated_type(member: Node<'_>) -> Option<Node<'_>> {
    let annotation = member.child_by_field_name("type")?;
    let mut cursor = annotation.walk();
    let found = annotation.named_children(&mut cursor).next();
    found
}

/// Recursive walk state.
struct SchemaWalker<'s> {
    /// Schema text.
    source: &'s [u8],
    /// Container segments above the current member.
    stack: Vec<String>,
    /// Accumulated output.
    result: SchemaKeys,
}

impl SchemaWalker<'_> {
    fn walk(&mut self, object_type: Node<'_>) {
        let mut cursor = object_type.walk();
        for member in object_type.named_children(&mut cursor) {
            match member.kind() {
                "property_signature" => self.visit_property(member),
                "comment" => {}
                other => {
                    let message = format!("unsupported member `{other}` ignored");
                    self.result.warnings.push(SchemaWarning::at(member, message));
                }
            }
        }
    }

    fn visit_property(&mut self, member: Node<'_>) {
        let Some((name, quoted)) = property_name(member, self.source) else {
            self.result.warnings.push(SchemaWarning::at(member, "computed property name ignored"));
            return;
        };
        let Some(type_node) = annotated_type(member) else {
            let message = format!("property `{name}` has no type annotation");
            self.result.warnings.push(SchemaWarning::at(member, message));
            return;
        };

        if type_node.kind() == "object_type" {
            self.stack.push(name);
            self.walk(type_node);
            self.stack.pop();
            return;
        }

        let key = if quoted && name.contains(KEY_SEPARATOR) {
            name
        } else {
            let mut segments = self.stack.clone();
            segments.push(name);
            segments.join(&KEY_SEPARATOR.to_string())
        };

        if key.is_empty() || key.split(KEY_SEPARATOR).any(str::is_empty) {
            self.result.warnings.push(SchemaWarning::at(member, format!("invalid key `{key}`")));
            return;
        }
        if !self.result.keys.insert(key.clone()) {
            self.result
                .warnings
                .push(SchemaWarning::at(member, format!("key `{key}` is declared more than once")));
        }
        self.result.declarations.push(LeafDeclaration {
            key,
            start_byte: member.start_byte(),
            end_byte: member.end_byte(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    const SCHEMA: &str = r#"// Canonical key shape.
export interface TranslationKeys {
  common: {
    save: string;
    /* block comment */
    cancel: string;
  };
  nav: {
    dashboard: string; // trailing comment
    'students-list': string;
  };
  students: {
    form: {
      name: string;
    };
  };
  "finance.fees.title": string;
}
"#;

    #[googletest::test]
    fn extracts_nested_keys() {
        let schema = extract_schema_keys(SCHEMA, "TranslationKeys").unwrap();

        expect_that!(
            schema.keys.iter().map(String::as_str).collect::<Vec<_>>(),
            elements_are![
                eq(&"common.cancel"),
                eq(&"common.save"),
                eq(&"finance.fees.title"),
                eq(&"nav.dashboard"),
                eq(&"nav.students-list"),
                eq(&"students.form.name")
            ]
        );
        expect_that!(schema.warnings, is_empty());
        expect_that!(schema.declarations, len(eq(6)));
    }

    #[googletest::test]
    fn type_alias_and_merged_interfaces() {
        let text = "type Keys = { a: { b: string } };\ninterface Other { x: string }";
        let merged = "interface K { a: string }\ninterface K { b: { c: string } }";

        let alias = extract_schema_keys(text, "Keys").unwrap();
        let merged = extract_schema_keys(merged, "K").unwrap();

        expect_that!(alias.keys.iter().collect::<Vec<_>>(), elements_are![eq(&"a.b")]);
        expect_that!(merged.keys.iter().collect::<Vec<_>>(), elements_are![eq(&"a"), eq(&"b.c")]);
    }

    #[googletest::test]
    fn missing_declaration_warns() {
        let schema =
            extract_schema_keys("interface Other { a: string }", "TranslationKeys").unwrap();

        expect_that!(schema.keys, is_empty());
        expect_that!(
            schema.warnings,
            elements_are![field!(SchemaWarning.message, contains_substring("not found"))]
        );
    }

    #[googletest::test]
    fn duplicate_and_untyped_members_warn() {
        let text = "interface TranslationKeys {\n  a: string;\n  a: string;\n  b;\n  m(): void;\n}";

        let schema = extract_schema_keys(text, "TranslationKeys").unwrap();

        expect_that!(schema.keys.len(), eq(1));
        expect_that!(
            schema.warnings,
            elements_are![
                all![
                    field!(&SchemaWarning.line, some(eq(3))),
                    field!(SchemaWarning.message, contains_substring("more than once"))
                ],
                field!(SchemaWarning.message, contains_substring("no type annotation")),
                field!(SchemaWarning.message, contains_substring("unsupported member"))
            ]
        );
    }

    #[googletest::test]
    fn syntax_error_is_reported() {
        let text = "interface TranslationKeys {\n  a: {\n    b: string;\n  c: string;\n}\n";

        let schema = extract_schema_keys(text, "TranslationKeys").unwrap();

        expect_that!(
            schema.warnings,
            contains(field!(SchemaWarning.message, contains_substring("syntax error")))
        );
    }

    #[rstest]
    fn warning_display_includes_line() {
        let warning = SchemaWarning { line: Some(4), message: "bad".to_string() };

        assert_eq!(warning.to_string(), "line 4: bad");
    }
}
