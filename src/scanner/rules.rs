//! Pattern rules recognizing translation-key literals in source text.

use std::ops::Range;

use regex::{
    Captures,
    Match,
    Regex,
};
use serde::Serialize;

use crate::config::UsageConfig;
use crate::types::{
    KEY_SEPARATOR,
    Key,
};

/// Which call-site shape produced a usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageKind {
    /// `t('a.b')`
    DirectCall,
    /// `showToast.error('a.b')`
    NotifierCall,
    /// `labelKey: 'a.b'`
    KeyProperty,
    /// `titleKey: 'x'`, materialized as `nav.x`
    NavigationTitle,
    /// `getValidationMessage('validation.x')`
    ValidationLookup,
    /// `validationMessages.x(...)`, materialized as `validation.x`
    ValidationHelper,
}

/// A quoted key literal found in source, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLiteral {
    pub kind: UsageKind,
    /// Text between the quotes.
    pub value: String,
    /// Byte range of `value` in the scanned text.
    pub span: Range<usize>,
}

/// A key usage accepted by the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUsage {
    pub key: String,
    pub kind: UsageKind,
    /// 1-indexed line.
    pub line: usize,
}

/// Compiled usage rules.
#[derive(Debug, Clone)]
pub struct UsageRules {
    direct: Regex,
    notifier: Regex,
    property: Regex,
    navigation: Regex,
    validation: Regex,
    helper: Option<Regex>,
    navigation_prefix: String,
    validation_namespace: String,
}

/// Quoted literal alternatives. Each alternative is its own capture group.
const QUOTED: &str = r#"(?:"([^"\n]+)"|'([^'\n]+)')"#;
const QUOTED_OR_TEMPLATE: &str = r#"(?:"([^"\n]+)"|'([^'\n]+)'|`([^`]+)`)"#;

fn alternation(names: &[String]) -> String {
    names.iter().map(|name| regex::escape(name)).collect::<Vec<_>>().join("|")
}

/// First capture group that participated in the match.
fn first_group<'t>(captures: &Captures<'t>) -> Option<Match<'t>> {
    captures.iter().skip(1).flatten().next()
}

impl UsageRules {
    pub fn new(config: &UsageConfig) -> Result<Self, regex::Error> {
        let functions = alternation(&config.translation_functions);
        let objects = alternation(&config.notifier_objects);
        let methods = alternation(&config.notifier_methods);
        let properties = alternation(&config.key_properties);
        let navigation = regex::escape(&config.navigation_property);
        let validation = regex::escape(&config.validation_function);

        let helper = config
            .validation_helper_object
            .as_deref()
            .filter(|object| !object.is_empty())
            .map(|object| {
                Regex::new(&format!(r"\b{}\.([A-Za-z_$][\w$]*)\s*\(", regex::escape(object)))
            })
            .transpose()?;

        Ok(Self {
            direct: Regex::new(&format!(r"\b(?:{functions})\(\s*{QUOTED_OR_TEMPLATE}"))?,
            notifier: Regex::new(&format!(r"\b(?:{objects})\.(?:{methods})\(\s*{QUOTED}"))?,
            property: Regex::new(&format!(r"\b(?:{properties})\s*:\s*{QUOTED}"))?,
            navigation: Regex::new(&format!(r"\b{navigation}\s*:\s*{QUOTED}"))?,
            validation: Regex::new(&format!(r"\b{validation}\(\s*{QUOTED}"))?,
            helper,
            navigation_prefix: config.navigation_prefix.clone(),
            validation_namespace: config.validation_namespace.clone(),
        })
    }

    /// Prefix materialized in front of navigation title values.
    #[must_use]
    pub fn navigation_prefix(&self) -> &str {
        &self.navigation_prefix
    }

    /// Every literal in the four rewritable call-site shapes, in text order.
    #[must_use]
    pub fn literals(&self, text: &str) -> Vec<KeyLiteral> {
        let shapes = [
            (&self.direct, UsageKind::DirectCall),
            (&self.notifier, UsageKind::NotifierCall),
            (&self.property, UsageKind::KeyProperty),
            (&self.navigation, UsageKind::NavigationTitle),
            (&self.validation, UsageKind::ValidationLookup),
        ];

        let mut literals: Vec<KeyLiteral> = shapes
            .iter()
            .flat_map(|(regex, kind)| {
                regex.captures_iter(text).filter_map(move |captures| {
                    let group = first_group(&captures)?;
                    Some(KeyLiteral {
                        kind: *kind,
                        value: group.as_str().to_string(),
                        span: group.range(),
                    })
                })
            })
            .collect();
        literals.sort_by_key(|literal| literal.span.start);
        literals
    }

    /// Extracts accepted key usages from one file body.
    ///
    /// Literals with `${` never count. Outside the validation lookup and the
    /// navigation title, a literal must contain a dot.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<KeyUsage> {
        let lines = LineIndex::new(text);
        let mut usages = Vec::new();
        let mut accept = |raw: &str, kind: UsageKind, offset: usize| {
            if Key::parse(raw).is_ok() {
                usages.push(KeyUsage { key: raw.to_string(), kind, line: lines.line_of(offset) });
            }
        };

        for literal in self.literals(text) {
            let value = literal.value.as_str();
            if value.contains("${") {
                continue;
            }
            let dotted = value.contains(KEY_SEPARATOR);
            let offset = literal.span.start;
            match literal.kind {
                UsageKind::NavigationTitle => {
                    accept(&format!("{}.{value}", self.navigation_prefix), literal.kind, offset);
                    if dotted {
                        accept(value, literal.kind, offset);
                    }
                }
                UsageKind::ValidationLookup => {
                    if value.starts_with(&format!("{}.", self.validation_namespace)) {
                        accept(value, literal.kind, offset);
                    }
                }
                _ if dotted => accept(value, literal.kind, offset),
                _ => {}
            }
        }

        if let Some(helper) = &self.helper {
            for captures in helper.captures_iter(text) {
                if let Some(method) = captures.get(1) {
                    accept(
                        &format!("{}.{}", self.validation_namespace, method.as_str()),
                        UsageKind::ValidationHelper,
                        method.start(),
                    );
                }
            }
        }

        usages
    }
}

/// Byte offset to line lookup.
#[derive(Debug)]
pub(crate) struct LineIndex {
    /// Byte offsets where each line starts.
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        let starts =
            std::iter::once(0).chain(text.match_indices('\n').map(|(i, _)| i + 1)).collect();
        Self { starts }
    }

    /// 1-indexed line containing `offset`.
    pub(crate) fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }
}
