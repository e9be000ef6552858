//! Inserting missing translations without overwriting existing ones.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
};

use super::MutationError;
use crate::store::{
    TranslationNode,
    TranslationTree,
};
use crate::types::{
    KEY_SEPARATOR,
    Key,
};

/// One entry of the add-missing input file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRequest {
    pub key: String,
    /// Target languages; every language when absent.
    #[serde(default)]
    pub missing_in: Option<Vec<String>>,
    #[serde(default)]
    pub values: IndexMap<String, String>,
}

/// Reads a JSON list of [`InsertRequest`]s.
pub fn read_requests(path: &Path) -> Result<Vec<InsertRequest>, MutationError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| MutationError::ReadRequests { path: path.to_path_buf(), source })?;
    serde_json::from_str(&text)
        .map_err(|source| MutationError::ParseRequests { path: path.to_path_buf(), source })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insertion {
    pub key: String,
    pub language: String,
    /// The reference value was used because the language value was blank.
    pub fallback_used: bool,
    /// A text leaf on the key's path that became a container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_leaf: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    InvalidKey,
    UnknownLanguage,
    /// A non-blank value is already there.
    AlreadyPresent,
    /// The key names an existing container.
    Conflict,
    NoValue,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidKey => "invalid key",
            Self::UnknownLanguage => "unknown language",
            Self::AlreadyPresent => "already translated",
            Self::Conflict => "conflicts with an existing entry",
            Self::NoValue => "no value provided",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedInsert {
    pub key: String,
    pub language: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub inserted: Vec<Insertion>,
    pub skipped: Vec<SkippedInsert>,
}

impl InsertOutcome {
    fn skip(&mut self, key: &str, language: Option<&str>, reason: SkipReason) {
        tracing::debug!(key, language, %reason, "Skipped insertion");
        self.skipped.push(SkippedInsert {
            key: key.to_string(),
            language: language.map(str::to_string),
            reason,
        });
    }

    /// Languages that received at least one insertion.
    #[must_use]
    pub fn touched_languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> =
            self.inserted.iter().map(|insertion| insertion.language.as_str()).collect();
        languages.sort_unstable();
        languages.dedup();
        languages
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// Whether `key` can take a text value in `tree`.
///
/// A leaf on the path is promoted to a container when the value is set;
/// its path is returned so the loss can be reported.
fn check_slot(tree: &TranslationTree, key: &Key) -> Result<Option<String>, SkipReason> {
    match tree.get(key) {
        None => {}
        Some(TranslationNode::Text(text)) if text.trim().is_empty() => return Ok(None),
        Some(TranslationNode::Container(_)) => return Err(SkipReason::Conflict),
        Some(_) => return Err(SkipReason::AlreadyPresent),
    }

    let mut prefix = String::new();
    let segments: Vec<&str> = key.segments().collect();
    for segment in segments.iter().take(segments.len().saturating_sub(1)) {
        if !prefix.is_empty() {
            prefix.push(KEY_SEPARATOR);
        }
        prefix.push_str(segment);
        let Ok(prefix_key) = Key::parse(&prefix) else {
            return Err(SkipReason::InvalidKey);
        };
        match tree.get(&prefix_key) {
            Some(TranslationNode::Container(_)) => {}
            Some(_) => return Ok(Some(prefix)),
            None => return Ok(None),
        }
    }
    Ok(None)
}

/// Applies insert requests to the language trees.
///
/// A language value that is blank falls back to the reference language's
/// value. Existing non-blank values are never touched, so running the same
/// requests twice inserts nothing the second time.
pub fn insert_missing(
    trees: &mut IndexMap<String, TranslationTree>,
    requests: &[InsertRequest],
    reference_language: &str,
) -> InsertOutcome {
    let mut outcome = InsertOutcome::default();
    let all_languages: Vec<String> = trees.keys().cloned().collect();

    for request in requests {
        let Ok(key) = Key::parse(&request.key) else {
            outcome.skip(&request.key, None, SkipReason::InvalidKey);
            continue;
        };
        let targets = request.missing_in.as_ref().unwrap_or(&all_languages);
        let reference_value = non_blank(request.values.get(reference_language));

        for language in targets {
            let Some(tree) = trees.get_mut(language) else {
                outcome.skip(&request.key, Some(language.as_str()), SkipReason::UnknownLanguage);
                continue;
            };
            let replaced_leaf = match check_slot(tree, &key) {
                Ok(replaced_leaf) => replaced_leaf,
                Err(reason) => {
                    outcome.skip(&request.key, Some(language.as_str()), reason);
                    continue;
                }
            };
            let (value, fallback_used) = match non_blank(request.values.get(language)) {
                Some(value) => (value, false),
                None => match reference_value {
                    Some(value) => (value, language != reference_language),
                    None => {
                        outcome.skip(&request.key, Some(language.as_str()), SkipReason::NoValue);
                        continue;
                    }
                },
            };

            if let Some(leaf) = &replaced_leaf {
                tracing::warn!(
                    key = %request.key,
                    language = %language,
                    "The value at '{leaf}' is replaced by a namespace"
                );
            }
            tree.set(&key, value);
            outcome.inserted.push(Insertion {
                key: request.key.clone(),
                language: language.clone(),
                fallback_used,
                replaced_leaf,
            });
        }
    }

    tracing::info!(
        inserted = outcome.inserted.len(),
        skipped = outcome.skipped.len(),
        fallbacks = outcome.inserted.iter().filter(|i| i.fallback_used).count(),
        "Computed insertions"
    );
    outcome
}
