//! Translation cache: remembers every value produced for a
//! `(key, source, target, source text)` tuple across runs.

use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Build the composite cache key `"{key}|{source}|{target}|{source_value}"`
pub fn cache_key(key: &str, source: Language, target: Language, source_value: &str) -> String {
    format!("{}|{}|{}|{}", key, source.code(), target.code(), source_value)
}

/// In-memory translation cache.
///
/// Loaded once per language run, written back once at the end. Entries are
/// never expired. Serialized with sorted keys so the cache file diffs cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationCache {
    entries: BTreeMap<String, String>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cache_key: &str) -> Option<&str> {
        self.entries.get(cache_key).map(String::as_str)
    }

    pub fn insert(&mut self, cache_key: String, translated: String) {
        self.entries.insert(cache_key, translated);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
