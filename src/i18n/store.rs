//! Where locale dictionaries and the translation cache live.

use crate::i18n::{DictionaryError, Language, LocaleNode, TranslationCache};
use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

/// Default cache file name inside the locales directory
pub const DEFAULT_CACHE_FILE: &str = "cache.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid locale file {}: {source}", path.display())]
    Dictionary {
        path: PathBuf,
        #[source]
        source: DictionaryError,
    },

    #[error("failed to encode translation cache: {0}")]
    CacheEncode(#[from] serde_json::Error),
}

/// Storage for locale dictionaries and the translation cache.
pub trait LocaleStore {
    /// Read a language's dictionary; `Ok(None)` when it does not exist yet
    fn read_dictionary(
        &self,
        language: Language,
    ) -> impl Future<Output = Result<Option<LocaleNode>, StoreError>> + Send;

    /// Write a language's dictionary and return where it was written
    fn write_dictionary(
        &self,
        language: Language,
        dictionary: &LocaleNode,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Read the translation cache; a missing cache is empty
    fn read_cache(&self) -> impl Future<Output = Result<TranslationCache, StoreError>> + Send;

    fn write_cache(
        &self,
        cache: &TranslationCache,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Locale files on disk: `<dir>/<code>.json` plus one cache file.
#[derive(Debug, Clone)]
pub struct FsLocaleStore {
    dir: PathBuf,
    cache_path: PathBuf,
}

impl FsLocaleStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let cache_path = dir.join(DEFAULT_CACHE_FILE);
        Self { dir, cache_path }
    }

    pub fn with_cache_path(mut self, cache_path: impl Into<PathBuf>) -> Self {
        self.cache_path = cache_path.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn path_for(&self, language: Language) -> PathBuf {
        self.dir.join(format!("{}.json", language.code()))
    }
}

/// Read a file, mapping "not found" to `None`
async fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn write_creating_dirs(path: &Path, contents: String) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, contents).await.map_err(io_err)
}

impl LocaleStore for FsLocaleStore {
    async fn read_dictionary(&self, language: Language) -> Result<Option<LocaleNode>, StoreError> {
        let path = self.path_for(language);
        let Some(contents) = read_optional(&path).await? else {
            debug!("No locale file at {}", path.display());
            return Ok(None);
        };

        LocaleNode::from_json_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Dictionary { path, source })
    }

    async fn write_dictionary(
        &self,
        language: Language,
        dictionary: &LocaleNode,
    ) -> Result<String, StoreError> {
        let path = self.path_for(language);
        let contents = dictionary
            .to_json_string()
            .map_err(|source| StoreError::Dictionary {
                path: path.clone(),
                source,
            })?;

        write_creating_dirs(&path, contents).await?;
        Ok(path.display().to_string())
    }

    async fn read_cache(&self) -> Result<TranslationCache, StoreError> {
        let Some(contents) = read_optional(&self.cache_path).await? else {
            return Ok(TranslationCache::new());
        };

        match serde_json::from_str(&contents) {
            Ok(cache) => Ok(cache),
            Err(e) => {
                warn!(
                    "Ignoring unreadable translation cache {}: {}",
                    self.cache_path.display(),
                    e
                );
                Ok(TranslationCache::new())
            }
        }
    }

    async fn write_cache(&self, cache: &TranslationCache) -> Result<(), StoreError> {
        let mut contents = serde_json::to_string_pretty(cache)?;
        contents.push('\n');
        write_creating_dirs(&self.cache_path, contents).await
    }
}

/// In-process store, for embedding the translator and for tests.
#[derive(Debug, Default)]
pub struct MemoryLocaleStore {
    dictionaries: Mutex<HashMap<&'static str, LocaleNode>>,
    cache: Mutex<TranslationCache>,
}

impl MemoryLocaleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dictionary(self, language: Language, dictionary: LocaleNode) -> Self {
        self.dictionaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(language.code(), dictionary);
        self
    }

    pub fn with_cache(self, cache: TranslationCache) -> Self {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = cache;
        self
    }

    pub fn dictionary(&self, language: Language) -> Option<LocaleNode> {
        self.dictionaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(language.code())
            .cloned()
    }

    pub fn cache(&self) -> TranslationCache {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LocaleStore for MemoryLocaleStore {
    async fn read_dictionary(&self, language: Language) -> Result<Option<LocaleNode>, StoreError> {
        Ok(self.dictionary(language))
    }

    async fn write_dictionary(
        &self,
        language: Language,
        dictionary: &LocaleNode,
    ) -> Result<String, StoreError> {
        self.dictionaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(language.code(), dictionary.clone());
        Ok(format!("memory://{}.json", language.code()))
    }

    async fn read_cache(&self) -> Result<TranslationCache, StoreError> {
        Ok(self.cache())
    }

    async fn write_cache(&self, cache: &TranslationCache) -> Result<(), StoreError> {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = cache.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> LocaleNode {
        LocaleNode::from_json(&json!({"common": {"save": "Kaydet"}})).expect("valid")
    }

    // ==================== Filesystem Store Tests ====================

    #[tokio::test]
    async fn test_fs_missing_dictionary_is_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = FsLocaleStore::new(dir.path());

        let result = store.read_dictionary(Language::TURKISH).await.expect("read");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_fs_write_then_read_dictionary() {
        let dir = TempDir::new().expect("temp dir");
        let store = FsLocaleStore::new(dir.path().join("locales"));

        let location = store
            .write_dictionary(Language::TURKISH, &sample())
            .await
            .expect("write");
        assert!(location.ends_with("tr.json"));

        let raw = std::fs::read_to_string(store.path_for(Language::TURKISH)).expect("file");
        assert!(raw.ends_with("}\n"));
        assert!(raw.contains("\n  \"common\""));

        let back = store.read_dictionary(Language::TURKISH).await.expect("read");
        assert_eq!(back, Some(sample()));
    }

    #[tokio::test]
    async fn test_fs_invalid_dictionary_is_error() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("en.json"), r#"{"items": [1, 2]}"#).expect("write");
        let store = FsLocaleStore::new(dir.path());

        let err = store.read_dictionary(Language::ENGLISH).await.unwrap_err();
        assert!(matches!(err, StoreError::Dictionary { .. }));
        assert!(err.to_string().contains("en.json"));
    }

    #[tokio::test]
    async fn test_fs_cache_missing_then_roundtrip() {
        let dir = TempDir::new().expect("temp dir");
        let store = FsLocaleStore::new(dir.path());
        assert!(store.read_cache().await.expect("read").is_empty());

        let mut cache = TranslationCache::new();
        cache.insert("common.save|en|tr|Save".to_string(), "Kaydet".to_string());
        store.write_cache(&cache).await.expect("write");

        assert!(store.cache_path().ends_with(DEFAULT_CACHE_FILE));
        assert_eq!(store.read_cache().await.expect("read"), cache);
    }

    #[tokio::test]
    async fn test_fs_corrupt_cache_starts_empty() {
        let dir = TempDir::new().expect("temp dir");
        let cache_path = dir.path().join("custom-cache.json");
        std::fs::write(&cache_path, "{ not json").expect("write");
        let store = FsLocaleStore::new(dir.path()).with_cache_path(&cache_path);

        assert!(store.read_cache().await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn test_fs_unwritable_dir_is_error() {
        let dir = TempDir::new().expect("temp dir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").expect("write");
        let store = FsLocaleStore::new(blocker.join("locales"));

        let err = store
            .write_dictionary(Language::TURKISH, &sample())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    // ==================== Memory Store Tests ====================

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryLocaleStore::new().with_dictionary(Language::ENGLISH, sample());

        assert_eq!(
            store.read_dictionary(Language::ENGLISH).await.expect("read"),
            Some(sample())
        );
        assert!(store
            .read_dictionary(Language::TURKISH)
            .await
            .expect("read")
            .is_none());

        let location = store
            .write_dictionary(Language::TURKISH, &sample())
            .await
            .expect("write");
        assert_eq!(location, "memory://tr.json");
        assert_eq!(store.dictionary(Language::TURKISH), Some(sample()));
    }
}
