//! Nested, insertion-ordered translation tree.

use indexmap::IndexMap;
use indexmap::map::Iter;

use crate::types::Key;

/// A node of a [`TranslationTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationNode {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Container(TranslationTree),
}

impl TranslationNode {
    /// String value of a text leaf.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }
}

/// Ordered mapping from segment to node.
///
/// After [`TranslationTree::remove`] no empty container remains on the removed path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTree {
    entries: IndexMap<String, TranslationNode>,
}

impl TranslationTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> Iter<'_, String, TranslationNode> {
        self.entries.iter()
    }

    /// Inserts a direct child, replacing an existing one in place.
    pub fn insert(&mut self, segment: impl Into<String>, node: TranslationNode) {
        self.entries.insert(segment.into(), node);
    }

    /// Looks up the node at `key`.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&TranslationNode> {
        let mut segments = key.segments();
        let first = segments.next()?;
        let mut node = self.entries.get(first)?;
        for segment in segments {
            let TranslationNode::Container(child) = node else {
                return None;
            };
            node = child.entries.get(segment)?;
        }
        Some(node)
    }

    /// String value at `key`, if it is a text leaf.
    #[must_use]
    pub fn get_text(&self, key: &Key) -> Option<&str> {
        self.get(key).and_then(TranslationNode::as_text)
    }

    /// Sets a text leaf at `key`, creating intermediate containers.
    ///
    /// A leaf sitting where an intermediate container is needed is replaced
    /// by an empty container.
    pub fn set(&mut self, key: &Key, value: impl Into<String>) {
        let segments: Vec<&str> = key.segments().collect();
        self.set_path(&segments, value.into());
    }

    fn set_path(&mut self, segments: &[&str], value: String) {
        match segments {
            [] => {}
            [last] => {
                self.entries.insert((*last).to_string(), TranslationNode::Text(value));
            }
            [head, rest @ ..] => {
                let node = self
                    .entries
                    .entry((*head).to_string())
                    .or_insert_with(|| TranslationNode::Container(Self::new()));
                if !node.is_container() {
                    tracing::debug!(segment = *head, "Replacing leaf with container");
                    *node = TranslationNode::Container(Self::new());
                }
                if let TranslationNode::Container(child) = node {
                    child.set_path(rest, value);
                }
            }
        }
    }

    /// Removes the node at `key` and every ancestor left empty by the removal.
    ///
    /// Returns `false` when nothing was at `key`.
    pub fn remove(&mut self, key: &Key) -> bool {
        let segments: Vec<&str> = key.segments().collect();
        self.remove_path(&segments)
    }

    fn remove_path(&mut self, segments: &[&str]) -> bool {
        match segments {
            [] => false,
            [last] => self.entries.shift_remove(*last).is_some(),
            [head, rest @ ..] => {
                let Some(TranslationNode::Container(child)) = self.entries.get_mut(*head) else {
                    return false;
                };
                let removed = child.remove_path(rest);
                if removed && child.is_empty() {
                    self.entries.shift_remove(*head);
                }
                removed
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    fn key(raw: &str) -> Key {
        Key::parse(raw).unwrap()
    }

    #[fixture]
    fn tree() -> TranslationTree {
        let mut tree = TranslationTree::new();
        tree.set(&key("common.save"), "Save");
        tree.set(&key("common.cancel"), "Cancel");
        tree.set(&key("students.form.name"), "Name");
        tree
    }

    #[rstest]
    fn get_text_reads_nested_leaf(tree: TranslationTree) {
        assert_that!(tree.get_text(&key("students.form.name")), some(eq("Name")));
        assert_that!(tree.get_text(&key("students.form")), none());
        assert_that!(tree.get_text(&key("students.form.name.extra")), none());
    }

    #[rstest]
    fn set_creates_intermediates_in_order(tree: TranslationTree) {
        let order: Vec<&String> = tree.iter().map(|(segment, _)| segment).collect();

        assert_eq!(order, vec!["common", "students"]);
    }

    #[rstest]
    fn set_overwrites_existing_leaf_in_place(mut tree: TranslationTree) {
        tree.set(&key("common.save"), "Store");

        assert_that!(tree.get_text(&key("common.save")), some(eq("Store")));
        let TranslationNode::Container(common) = tree.get(&key("common")).unwrap() else {
            panic!("common should be a container");
        };
        let order: Vec<&String> = common.iter().map(|(segment, _)| segment).collect();
        assert_eq!(order, vec!["save", "cancel"]);
    }

    #[rstest]
    fn set_replaces_leaf_blocking_intermediate(mut tree: TranslationTree) {
        tree.set(&key("common.save.short"), "S");

        assert_that!(tree.get_text(&key("common.save.short")), some(eq("S")));
        assert_that!(tree.get_text(&key("common.save")), none());
    }

    #[rstest]
    fn remove_prunes_empty_ancestors(mut tree: TranslationTree) {
        assert!(tree.remove(&key("students.form.name")));

        assert_that!(tree.get(&key("students")), none());
        assert_that!(tree.len(), eq(1));
    }

    #[rstest]
    fn remove_keeps_non_empty_ancestors(mut tree: TranslationTree) {
        assert!(tree.remove(&key("common.save")));

        assert_that!(tree.get_text(&key("common.cancel")), some(eq("Cancel")));
    }

    #[rstest]
    #[case::missing_leaf("common.delete")]
    #[case::missing_namespace("finance.fees")]
    #[case::through_leaf("common.save.short")]
    fn remove_missing_key_is_noop(mut tree: TranslationTree, #[case] raw: &str) {
        let before = tree.clone();

        assert!(!tree.remove(&key(raw)));
        assert_eq!(tree, before);
    }

    #[rstest]
    fn removing_last_leaf_leaves_empty_tree() {
        let mut tree = TranslationTree::new();
        tree.set(&key("a.b.c"), "x");

        tree.remove(&key("a.b.c"));

        assert!(tree.is_empty());
    }
}
