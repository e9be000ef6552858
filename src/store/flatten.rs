//! Conversion between nested trees and flat `key -> value` maps.

use super::tree::{
    TranslationNode,
    TranslationTree,
};
use crate::types::{
    FlatKeyMap,
    Key,
    join_key,
};

/// Which leaves [`flatten`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeafMode {
    /// String leaves only.
    #[default]
    Text,
    /// Strings, numbers and booleans, rendered as text.
    Scalar,
}

/// Flattens a tree depth-first in source order.
///
/// The root itself never produces a key.
///
/// # Examples
/// ```
/// use i18n_keysync::store::{LeafMode, TranslationTree, flatten};
/// use i18n_keysync::types::Key;
///
/// let mut tree = TranslationTree::new();
/// tree.set(&Key::parse("common.hello").unwrap(), "Hello");
///
/// let flat = flatten(&tree, LeafMode::Text);
/// assert_eq!(flat.get("common.hello"), Some(&"Hello".to_string()));
/// ```
#[must_use]
pub fn flatten(tree: &TranslationTree, mode: LeafMode) -> FlatKeyMap {
    let mut result = FlatKeyMap::new();
    flatten_into(tree, None, mode, &mut result);
    result
}

fn flatten_into(
    tree: &TranslationTree,
    prefix: Option<&str>,
    mode: LeafMode,
    result: &mut FlatKeyMap,
) {
    for (segment, node) in tree.iter() {
        let full_key = join_key(prefix, segment);
        match (node, mode) {
            (TranslationNode::Container(child), _) => {
                flatten_into(child, Some(&full_key), mode, result);
            }
            (TranslationNode::Text(text), _) => {
                result.insert(full_key, text.clone());
            }
            (TranslationNode::Number(number), LeafMode::Scalar) => {
                result.insert(full_key, number.to_string());
            }
            (TranslationNode::Bool(flag), LeafMode::Scalar) => {
                result.insert(full_key, flag.to_string());
            }
            (TranslationNode::Number(_) | TranslationNode::Bool(_), LeafMode::Text) => {}
        }
    }
}

/// Rebuilds a tree from a flat map. Inverse of [`flatten`] for text trees.
///
/// Keys that are not valid translation keys are skipped with a warning.
#[must_use]
pub fn unflatten(map: &FlatKeyMap) -> TranslationTree {
    let mut tree = TranslationTree::new();
    for (raw, value) in map {
        match Key::parse(raw) {
            Ok(key) => tree.set(&key, value.clone()),
            Err(e) => tracing::warn!("Skipping key during unflatten: {e}"),
        }
    }
    tree
}
