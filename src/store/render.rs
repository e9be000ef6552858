//! Rendering trees back into translation data modules.

use serde::ser::{
    Serialize,
    SerializeMap,
    Serializer,
};

use super::tree::{
    TranslationNode,
    TranslationTree,
};
use crate::input::{
    ExportForm,
    TranslationFormat,
};

impl Serialize for TranslationTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (segment, node) in self.iter() {
            map.serialize_entry(segment, node)?;
        }
        map.end()
    }
}

impl Serialize for TranslationNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Number(number) => number.serialize(serializer),
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Container(tree) => tree.serialize(serializer),
        }
    }
}

/// How a data module is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLayout {
    pub format: TranslationFormat,
    /// Export form read from the existing module; ignored for JSON.
    pub export: ExportForm,
    /// `(type name, import path)` used to annotate the export.
    pub type_annotation: Option<(String, String)>,
}

/// Renders a tree as a data module.
///
/// TypeScript and JavaScript modules export a 2-space indented object
/// literal the same way the module was loaded; JSON files hold the object
/// itself. Output ends with a newline.
///
/// The type annotation applies to named bindings only; a bare
/// `export default {...}` is written without it.
pub fn render_module(tree: &TranslationTree, layout: &ModuleLayout) -> serde_json::Result<String> {
    let body = serde_json::to_string_pretty(tree)?;
    if layout.format == TranslationFormat::Json {
        return Ok(format!("{body}\n"));
    }

    let annotation = match (&layout.format, &layout.type_annotation) {
        (TranslationFormat::TypeScript, Some(annotation)) => Some(annotation),
        _ => None,
    };
    let (header, type_suffix) = match annotation {
        Some((type_name, import_path)) if layout.export != ExportForm::Default => (
            format!("import type {{ {type_name} }} from '{import_path}';\n\n"),
            format!(": {type_name}"),
        ),
        _ => (String::new(), String::new()),
    };

    let rendered = match &layout.export {
        ExportForm::Const(name) => format!("{header}export const {name}{type_suffix} = {body};\n"),
        ExportForm::Default => format!("export default {body};\n"),
        ExportForm::DefaultBinding(name) => {
            format!("{header}const {name}{type_suffix} = {body};\n\nexport default {name};\n")
        }
    };
    Ok(rendered)
}
