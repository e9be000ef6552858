//! Rendering a schema declaration from a translation tree.

use std::fmt::Write as _;

use crate::store::{
    TranslationNode,
    TranslationTree,
};

/// Renders `export interface <type_name> { ... }` mirroring `tree`.
///
/// Segments that are not identifiers are quoted.
#[must_use]
pub fn render_schema(tree: &TranslationTree, type_name: &str) -> String {
    let mut out = format!("export interface {type_name} {{\n");
    render_members(tree, 1, &mut out);
    out.push_str("}\n");
    out
}

fn render_members(tree: &TranslationTree, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (segment, node) in tree.iter() {
        let name = property_name(segment);
        let leaf_type = match node {
            TranslationNode::Container(child) => {
                let _ = writeln!(out, "{indent}{name}: {{");
                render_members(child, depth + 1, out);
                let _ = writeln!(out, "{indent}}};");
                continue;
            }
            TranslationNode::Text(_) => "string",
            TranslationNode::Number(_) => "number",
            TranslationNode::Bool(_) => "boolean",
        };
        let _ = writeln!(out, "{indent}{name}: {leaf_type};");
    }
}

fn property_name(segment: &str) -> String {
    let mut chars = segment.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        segment.to_string()
    } else {
        serde_json::Value::String(segment.to_string()).to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::*;

    use super::*;
    use crate::schema::extract_schema_keys;
    use crate::store::{
        LeafMode,
        flatten,
    };
    use crate::types::Key;

    #[rstest]
    fn renders_nested_interface() {
        let mut tree = TranslationTree::new();
        tree.set(&Key::parse("common.save").unwrap(), "Save");
        tree.set(&Key::parse("nav.students-list").unwrap(), "Students");
        tree.insert("max", TranslationNode::Number(serde_json::Number::from(3)));

        let rendered = render_schema(&tree, "TranslationKeys");

        assert_eq!(
            rendered,
            r#"export interface TranslationKeys {
  common: {
    save: string;
  };
  nav: {
    "students-list": string;
  };
  max: number;
}
"#
        );
    }

    #[rstest]
    fn rendered_schema_declares_every_tree_key() {
        let mut tree = TranslationTree::new();
        for key in ["a.b.c", "a.d", "e", "f.g-h"] {
            tree.set(&Key::parse(key).unwrap(), "x");
        }

        let schema = extract_schema_keys(&render_schema(&tree, "Keys"), "Keys").unwrap();

        let expected: Vec<String> = flatten(&tree, LeafMode::Text).keys().cloned().collect();
        let mut actual: Vec<String> = schema.keys.into_iter().collect();
        actual.sort();
        let mut expected_sorted = expected;
        expected_sorted.sort();
        assert_eq!(actual, expected_sorted);
    }
}
