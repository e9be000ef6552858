//! In-memory translation trees: lookup, mutation, flattening and rendering.

/// Flat views of a tree
mod flatten;
/// Module rendering
mod render;
/// Tree type
mod tree;

pub use flatten::{
    LeafMode,
    flatten,
    unflatten,
};
pub use render::{
    ModuleLayout,
    render_module,
};
pub use tree::{
    TranslationNode,
    TranslationTree,
};
