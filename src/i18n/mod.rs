//! Locale translation.
//!
//! Takes the source-language locale dictionary and produces translated
//! dictionaries for the other supported languages, reusing a persistent
//! cache and tolerating a flaky translation backend.
//!
//! # Architecture
//!
//! - `registry`: the allow-list of supported languages
//! - `language`: validated `Language` type
//! - `dictionary`: nested locale trees, flatten/unflatten and key diffing
//! - `cache`: translation cache keyed by key, languages and source text
//! - `store`: where dictionaries and the cache are read from and written to
//! - `backend`: the translation service
//! - `validator`: placeholder and markup preservation checks
//! - `metrics`: per-run counters
//! - `pipeline`: the per-language run and the multi-language driver
//!
//! # Example
//!
//! ```rust,ignore
//! use portal_toolkit::i18n::{FsLocaleStore, HttpTranslationBackend, LocaleTranslator, PipelineOptions};
//!
//! let backend = HttpTranslationBackend::new(reqwest::Client::new(), "http://localhost:5000/translate");
//! let translator = LocaleTranslator::new(backend, FsLocaleStore::new("locales"), PipelineOptions::default());
//! let summary = translator.translate_languages(&["tr", "de"]).await;
//! ```

mod backend;
mod cache;
mod dictionary;
mod language;
mod metrics;
mod pipeline;
mod registry;
mod store;
mod validator;

pub use backend::{HttpTranslationBackend, TranslateError, TranslationBackend};
pub use cache::{cache_key, TranslationCache};
pub use dictionary::{
    flatten, missing_keys, unflatten, DictionaryError, FlatDictionary, LocaleNode, KEY_SEPARATOR,
};
pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use pipeline::{LanguageReport, LocaleTranslator, PipelineOptions, RunSummary};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use store::{FsLocaleStore, LocaleStore, MemoryLocaleStore, StoreError, DEFAULT_CACHE_FILE};
pub use validator::{TranslationValidator, ValidationReport};
