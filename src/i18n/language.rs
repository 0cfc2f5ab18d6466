//! Language type: a locale code validated against the registry.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};

/// A validated, enabled language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "tr")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };

    pub const TURKISH: Language = Language { code: "tr" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language {
                code: config.code, // Use the static str from the registry
            }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The default source language for locale files.
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    /// Every enabled language except `source`, in registry order.
    pub fn targets_for(source: Language) -> Vec<Language> {
        LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .filter(|config| config.code != source.code)
            .map(|config| Language { code: config.code })
            .collect()
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the language code is not found in the registry. This should
    /// never happen if the Language was constructed properly (via `from_code`
    /// or constants).
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Get the native name of the language.
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_english_constant() {
        assert_eq!(Language::ENGLISH.code(), "en");
        assert_eq!(Language::ENGLISH.name(), "English");
    }

    #[test]
    fn test_turkish_constant() {
        assert_eq!(Language::TURKISH.code(), "tr");
        assert_eq!(Language::TURKISH.native_name(), "Türkçe");
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_valid() {
        let language = Language::from_code("de").expect("Should succeed");
        assert_eq!(language.code(), "de");
        assert_eq!(language.name(), "German");
    }

    #[test]
    fn test_from_code_unknown() {
        let result = Language::from_code("xx");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_disabled() {
        let result = Language::from_code("fa");
        assert!(result.unwrap_err().to_string().contains("not enabled"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    // ==================== Target Selection Tests ====================

    #[test]
    fn test_canonical_is_english() {
        assert_eq!(Language::canonical(), Language::ENGLISH);
    }

    #[test]
    fn test_targets_exclude_source() {
        let targets = Language::targets_for(Language::ENGLISH);
        assert!(!targets.contains(&Language::ENGLISH));
        assert!(targets.contains(&Language::TURKISH));
        assert!(targets.iter().all(|l| l.code() != "fa"));
    }

    #[test]
    fn test_targets_from_other_source_include_english() {
        let targets = Language::targets_for(Language::TURKISH);
        assert!(targets.contains(&Language::ENGLISH));
        assert!(!targets.contains(&Language::TURKISH));
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::TURKISH.to_string(), "tr");
    }
}
