//! Language registry: the allow-list of locale codes the translator accepts.
//!
//! Uses a `OnceLock` singleton; the list is fixed at compile time.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code, also the locale file stem (e.g. "tr" -> tr.json)
    pub code: &'static str,

    /// English name of the language (e.g., "Turkish")
    pub name: &'static str,

    /// Native name of the language (e.g., "Türkçe")
    pub native_name: &'static str,

    /// Whether this is the default source language (only one should be true)
    pub is_canonical: bool,

    /// Whether this language can be used as a translation target
    pub enabled: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if no canonical language is found or if multiple canonical
    /// languages are defined (this indicates a configuration error).
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }
}

/// Languages the portal ships locale files for
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: true,
            enabled: true,
        },
        LanguageConfig {
            code: "tr",
            name: "Turkish",
            native_name: "Türkçe",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "de",
            name: "German",
            native_name: "Deutsch",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "it",
            name: "Italian",
            native_name: "Italiano",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "pt",
            name: "Portuguese",
            native_name: "Português",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "nl",
            name: "Dutch",
            native_name: "Nederlands",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "ar",
            name: "Arabic",
            native_name: "العربية",
            is_canonical: false,
            enabled: true,
        },
        // Right-to-left layout for Persian is not finished in the portal
        LanguageConfig {
            code: "fa",
            name: "Persian",
            native_name: "فارسی",
            is_canonical: false,
            enabled: false,
        },
    ]
}
