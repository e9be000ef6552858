//! Rewriting key references in application source.

use std::path::PathBuf;

use super::mapping::KeyMapping;
use crate::scanner::{
    KeyLiteral,
    SourceText,
    UsageKind,
    UsageRules,
};

/// New contents of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRewrite {
    pub path: PathBuf,
    pub relative: PathBuf,
    pub text: String,
    pub replacements: usize,
}

/// Replacement text for one literal, if the mapping covers it.
///
/// A navigation title holds the key without its prefix, so it is looked up
/// with the prefix and written back without it.
fn replacement_for(
    literal: &KeyLiteral,
    rules: &UsageRules,
    mapping: &KeyMapping,
) -> Option<String> {
    if literal.value.contains("${") {
        return None;
    }
    if let Some(new) = mapping.target(&literal.value) {
        return Some(new.to_string());
    }
    if literal.kind != UsageKind::NavigationTitle {
        return None;
    }

    let prefix = format!("{}.", rules.navigation_prefix());
    let new = mapping.target(&format!("{prefix}{}", literal.value))?;
    let bare = new.strip_prefix(&prefix);
    if bare.is_none() {
        tracing::warn!(
            "Cannot rewrite navigation title '{}': '{new}' is outside the '{prefix}' namespace",
            literal.value
        );
    }
    bare.map(str::to_string)
}

/// Applies `mapping` to every key literal of `text`.
///
/// Replacements are located on the original text and applied in a single
/// pass; only the characters between the quotes change. Returns the new text
/// and the number of replacements.
#[must_use]
pub fn rewrite_text(text: &str, rules: &UsageRules, mapping: &KeyMapping) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut replacements = 0;

    for literal in rules.literals(text) {
        if literal.span.start < cursor {
            continue;
        }
        let Some(new) = replacement_for(&literal, rules, mapping) else {
            continue;
        };
        let quote = text.get(..literal.span.start).and_then(|head| head.chars().next_back());
        if quote.is_some_and(|q| new.contains(q)) {
            tracing::warn!(
                "Cannot rewrite '{}' to '{new}': the new key contains its quote",
                literal.value
            );
            continue;
        }

        out.push_str(text.get(cursor..literal.span.start).unwrap_or_default());
        out.push_str(&new);
        cursor = literal.span.end;
        replacements += 1;
    }

    out.push_str(text.get(cursor..).unwrap_or_default());
    (out, replacements)
}

/// Rewrites every source with at least one replacement.
#[must_use]
pub fn rewrite_sources(
    sources: &[SourceText],
    rules: &UsageRules,
    mapping: &KeyMapping,
) -> Vec<FileRewrite> {
    sources
        .iter()
        .filter_map(|source| {
            let (text, replacements) = rewrite_text(&source.text, rules, mapping);
            (replacements > 0).then(|| FileRewrite {
                path: source.path.clone(),
                relative: source.relative.clone(),
                text,
                replacements,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::*;

    use super::*;
    use crate::config::UsageConfig;

    #[fixture]
    fn rules() -> UsageRules {
        UsageRules::new(&UsageConfig::default()).unwrap()
    }

    fn mapping(raw: &[(&str, &str)]) -> KeyMapping {
        KeyMapping::new(raw.iter().map(|(o, n)| ((*o).to_string(), (*n).to_string())).collect())
            .unwrap()
    }

    #[rstest]
    fn rewrites_every_call_site_shape(rules: UsageRules) {
        let text = r#"t('old.a');
showToast.error("old.a");
const f = { labelKey: 'old.a', titleKey: 'home' };
getValidationMessage('validation.old');
t(`old.${x}`);
"#;
        let mapping = mapping(&[
            ("old.a", "new.a"),
            ("nav.home", "nav.dashboard"),
            ("validation.old", "validation.required"),
        ]);

        let (rewritten, count) = rewrite_text(text, &rules, &mapping);

        assert_eq!(
            rewritten,
            r#"t('new.a');
showToast.error("new.a");
const f = { labelKey: 'new.a', titleKey: 'dashboard' };
getValidationMessage('validation.required');
t(`old.${x}`);
"#
        );
        assert_eq!(count, 5);
    }

    #[rstest]
    fn leaves_unmapped_and_unrelated_text(rules: UsageRules) {
        let text = "const label = 'old.a'; t('other.key');";

        let (rewritten, count) = rewrite_text(text, &rules, &mapping(&[("old.a", "new.a")]));

        assert_eq!(rewritten, text);
        assert_eq!(count, 0);
    }

    #[rstest]
    fn navigation_target_outside_prefix_is_skipped(rules: UsageRules) {
        let text = "titleKey: 'home'";

        let (rewritten, _) = rewrite_text(text, &rules, &mapping(&[("nav.home", "pages.home")]));

        assert_eq!(rewritten, text);
    }

    #[rstest]
    fn rewriting_twice_changes_nothing(rules: UsageRules) {
        let mapping = mapping(&[("old.a", "new.a")]);
        let (once, _) = rewrite_text("t('old.a') + t('old.a')", &rules, &mapping);

        let (twice, count) = rewrite_text(&once, &rules, &mapping);

        assert_eq!(twice, "t('new.a') + t('new.a')");
        assert_eq!(count, 0);
    }

    #[rstest]
    fn only_changed_files_are_returned(rules: UsageRules) {
        let sources = [
            SourceText {
                path: PathBuf::from("/ws/src/a.ts"),
                relative: PathBuf::from("src/a.ts"),
                text: "t('old.a')".to_string(),
            },
            SourceText {
                path: PathBuf::from("/ws/src/b.ts"),
                relative: PathBuf::from("src/b.ts"),
                text: "t('keep.me')".to_string(),
            },
        ];

        let rewrites = rewrite_sources(&sources, &rules, &mapping(&[("old.a", "new.a")]));

        assert_eq!(rewrites.len(), 1);
        assert_eq!(rewrites[0].relative, PathBuf::from("src/a.ts"));
        assert_eq!(rewrites[0].replacements, 1);
    }
}
