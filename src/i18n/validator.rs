//! Translation quality validation.
//!
//! Machine translation happily rewrites interpolation variables and markup
//! inside locale strings. This checks that a translated value still carries
//! the placeholders (`{{count}}`, `{name}`), nesting references (`$t(key)`)
//! and inline tags (`<1>`, `</strong>`) of the source value.

use regex::Regex;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that break the string at runtime (lost interpolation)
    pub errors: Vec<String>,

    /// Problems that degrade rendering (lost markup)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for translated locale values.
pub struct TranslationValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static NESTING_REGEX: OnceLock<Regex> = OnceLock::new();
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Validate that `translated` preserves the interpolation and markup of
    /// `original`.
    pub fn validate(original: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        let orig_placeholders = Self::extract_placeholders(original);
        let trans_placeholders = Self::extract_placeholders(translated);
        if orig_placeholders != trans_placeholders {
            report.errors.push(format!(
                "Placeholder mismatch: original has {:?}, translation has {:?}",
                orig_placeholders, trans_placeholders
            ));
        }

        let orig_nesting = Self::extract_nesting(original);
        let trans_nesting = Self::extract_nesting(translated);
        if orig_nesting != trans_nesting {
            report.errors.push(format!(
                "Nested key mismatch: original has {:?}, translation has {:?}",
                orig_nesting, trans_nesting
            ));
        }

        let orig_tags = Self::extract_tags(original);
        let trans_tags = Self::extract_tags(translated);
        if orig_tags != trans_tags {
            report.warnings.push(format!(
                "Tag mismatch: original has {:?}, translation has {:?}",
                orig_tags, trans_tags
            ));
        }

        report
    }

    /// `{{name}}` and `{name}` placeholders, normalized and sorted
    fn extract_placeholders(text: &str) -> Vec<String> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}|\{\s*([A-Za-z0-9_.]+)\s*\}").unwrap());

        let mut found: Vec<String> = regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)))
            .map(|m| m.as_str().to_string())
            .collect();
        found.sort();
        found
    }

    /// `$t(key)` nesting references
    fn extract_nesting(text: &str) -> Vec<String> {
        let regex = NESTING_REGEX.get_or_init(|| Regex::new(r"\$t\(([^)]+)\)").unwrap());

        let mut found: Vec<String> = regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
            .collect();
        found.sort();
        found
    }

    /// Opening, closing and self-closing tags by name
    fn extract_tags(text: &str) -> Vec<String> {
        let regex = TAG_REGEX.get_or_init(|| Regex::new(r"</?([A-Za-z0-9]+)\s*/?>").unwrap());

        let mut found: Vec<String> = regex
            .find_iter(text)
            .map(|m| m.as_str().replace(' ', ""))
            .collect();
        found.sort();
        found
    }
}
