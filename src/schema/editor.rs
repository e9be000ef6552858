//! Removing leaf declarations from schema text.

use tree_sitter::Node;

use super::parser::{
    annotated_type,
    extract_schema_keys,
    find_type_bodies,
};
use crate::input::{
    ProgrammingLanguage,
    SyntaxError,
};
use crate::types::FlatKeySet;

/// Upper bound on empty-container cleanup rounds (one per nesting level).
const MAX_CLEANUP_ROUNDS: usize = 32;

/// Result of [`remove_schema_keys`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEdit {
    pub text: String,
    /// Keys whose declarations were removed, in schema order.
    pub removed: Vec<String>,
}

/// Removes the leaf declarations of `keys` from the schema text.
///
/// Each declaration is cut together with its separator; a line left blank is
/// dropped. Container declarations emptied by the removal are then collapsed
/// until none remain. Keys not declared in the schema are ignored.
pub fn remove_schema_keys(
    text: &str,
    type_name: &str,
    keys: &FlatKeySet,
) -> Result<SchemaEdit, SyntaxError> {
    let schema = extract_schema_keys(text, type_name)?;
    let targets: Vec<_> =
        schema.declarations.into_iter().filter(|decl| keys.contains(&decl.key)).collect();

    let spans = targets.iter().map(|decl| (decl.start_byte, decl.end_byte)).collect::<Vec<_>>();
    let mut edited = cut_spans(text, &spans);

    for _ in 0..MAX_CLEANUP_ROUNDS {
        let empty = empty_container_spans(&edited, type_name)?;
        if empty.is_empty() {
            break;
        }
        edited = cut_spans(&edited, &empty);
    }

    Ok(SchemaEdit { text: edited, removed: targets.into_iter().map(|decl| decl.key).collect() })
}

/// Spans of container properties whose object type has no members left.
fn empty_container_spans(text: &str, type_name: &str) -> Result<Vec<(usize, usize)>, SyntaxError> {
    let tree = ProgrammingLanguage::TypeScript.parse(text)?;
    let mut spans = Vec::new();
    for body in find_type_bodies(tree.root_node(), type_name, text.as_bytes()) {
        collect_empty_containers(body, &mut spans);
    }
    Ok(spans)
}

fn collect_empty_containers(object_type: Node<'_>, spans: &mut Vec<(usize, usize)>) {
    let mut cursor = object_type.walk();
    for member in object_type.named_children(&mut cursor) {
        if member.kind() != "property_signature" {
            continue;
        }
        let Some(type_node) = annotated_type(member).filter(|t| t.kind() == "object_type") else {
            continue;
        };
        let mut inner = type_node.walk();
        let has_members = type_node.named_children(&mut inner).any(|n| n.kind() != "comment");
        if has_members {
            collect_empty_containers(type_node, spans);
        } else {
            spans.push((member.start_byte(), member.end_byte()));
        }
    }
}

/// Cuts every span (widened by [`removal_span`]) out of `text`.
fn cut_spans(text: &str, spans: &[(usize, usize)]) -> String {
    let mut widened: Vec<(usize, usize)> =
        spans.iter().map(|&(start, end)| removal_span(text, start, end)).collect();
    widened.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(widened.len());
    for (start, end) in widened {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end) in merged {
        out.push_str(text.get(cursor..start).unwrap_or_default());
        cursor = end;
    }
    out.push_str(text.get(cursor..).unwrap_or_default());
    out
}

/// Widens a member span to include its separator, or whole lines when the
/// member is alone on them.
///
/// Without a trailing `;`/`,` the preceding separator is taken instead, so
/// no separator is left dangling before a closing brace.
fn removal_span(text: &str, start: usize, end: usize) -> (usize, usize) {
    let bytes = text.as_bytes();
    let is_separator = |i: usize| matches!(bytes.get(i), Some(b';' | b','));

    let mut probe = end;
    while matches!(bytes.get(probe), Some(b' ' | b'\t')) {
        probe += 1;
    }

    let (start, end) = if is_separator(probe) {
        (start, probe + 1)
    } else {
        let mut back = start;
        while back > 0 && bytes.get(back - 1).is_some_and(u8::is_ascii_whitespace) {
            back -= 1;
        }
        if back > 0 && is_separator(back - 1) {
            return (back - 1, end);
        }
        (start, end)
    };

    let line_start = text.get(..start).and_then(|head| head.rfind('\n')).map_or(0, |i| i + 1);
    let line_end =
        text.get(end..).and_then(|tail| tail.find('\n')).map_or(text.len(), |i| end + i + 1);

    let blank_before = text.get(line_start..start).is_some_and(|s| s.trim().is_empty());
    let blank_after = text.get(end..line_end).is_some_and(|s| s.trim().is_empty());
    if blank_before && blank_after { (line_start, line_end) } else { (start, end) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::*;

    use super::*;
    use crate::test_utils::key_set;

    const SCHEMA: &str = "export interface TranslationKeys {
  common: {
    save: string;
    cancel: string;
  };
  legacy: {
    old: {
      title: string;
    };
  };
  nav: { home: string; about: string };
}
";

    #[rstest]
    fn removes_leaf_lines() {
        let edit =
            remove_schema_keys(SCHEMA, "TranslationKeys", &key_set(&["common.cancel"])).unwrap();

        assert_eq!(
            edit.text,
            "export interface TranslationKeys {
  common: {
    save: string;
  };
  legacy: {
    old: {
      title: string;
    };
  };
  nav: { home: string; about: string };
}
"
        );
        assert_eq!(edit.removed, vec!["common.cancel".to_string()]);
    }

    #[rstest]
    fn collapses_emptied_containers() {
        let edit =
            remove_schema_keys(SCHEMA, "TranslationKeys", &key_set(&["legacy.old.title"])).unwrap();

        assert_eq!(
            edit.text,
            "export interface TranslationKeys {
  common: {
    save: string;
    cancel: string;
  };
  nav: { home: string; about: string };
}
"
        );
    }

    #[rstest]
    fn removes_inline_members_without_dangling_separator() {
        let edit = remove_schema_keys(SCHEMA, "TranslationKeys", &key_set(&["nav.about"])).unwrap();

        assert!(edit.text.contains("  nav: { home: string };\n"));
    }

    #[rstest]
    fn removing_every_inline_member_drops_container() {
        let edit =
            remove_schema_keys(SCHEMA, "TranslationKeys", &key_set(&["nav.home", "nav.about"]))
                .unwrap();

        assert!(!edit.text.contains("nav"));
        assert_eq!(extract_schema_keys(&edit.text, "TranslationKeys").unwrap().keys.len(), 3);
    }

    #[rstest]
    fn unknown_keys_leave_text_untouched() {
        let edit =
            remove_schema_keys(SCHEMA, "TranslationKeys", &key_set(&["missing.key"])).unwrap();

        assert_eq!(edit.text, SCHEMA);
        assert!(edit.removed.is_empty());
    }

    #[rstest]
    fn removal_is_idempotent() {
        let target = key_set(&["common.save", "legacy.old.title"]);
        let once = remove_schema_keys(SCHEMA, "TranslationKeys", &target).unwrap();

        let twice = remove_schema_keys(&once.text, "TranslationKeys", &target).unwrap();

        assert_eq!(twice.text, once.text);
    }
}
