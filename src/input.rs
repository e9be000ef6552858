//! Parsing of on-disk inputs: source languages and translation data modules.

pub mod source;
pub mod translation;

pub use source::{
    ProgrammingLanguage,
    SyntaxError,
};
pub use translation::{
    ExportForm,
    ParsedModule,
    TranslationFormat,
    TranslationLoadError,
    TranslationModule,
    load_module,
    parse_module,
};
