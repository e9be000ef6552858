//! Removing keys from every language tree.

use indexmap::IndexMap;

use crate::store::TranslationTree;
use crate::types::{
    FlatKeySet,
    Key,
};

/// Removes `keys` from each tree, pruning emptied ancestors.
///
/// Returns the removed keys per language; languages where nothing was
/// removed are left out. Keys that are not valid are ignored.
pub fn remove_keys(
    trees: &mut IndexMap<String, TranslationTree>,
    keys: &FlatKeySet,
) -> IndexMap<String, Vec<String>> {
    let parsed: Vec<Key> = keys
        .iter()
        .filter_map(|raw| match Key::parse(raw) {
            Ok(key) => Some(key),
            Err(err) => {
                tracing::warn!("Skipping removal: {err}");
                None
            }
        })
        .collect();

    let mut removed = IndexMap::new();
    for (language, tree) in trees.iter_mut() {
        let gone: Vec<String> =
            parsed.iter().filter(|key| tree.remove(key)).map(ToString::to_string).collect();
        if !gone.is_empty() {
            tracing::debug!(language = %language, removed = gone.len(), "Removed keys");
            removed.insert(language.clone(), gone);
        }
    }
    removed
}
