use crate::i18n::{
    FsLocaleStore, HttpTranslationBackend, Language, PipelineOptions, DEFAULT_CACHE_FILE,
};
use crate::retry::RetryConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Translation backend
    pub translate_api_url: String,
    pub translate_api_key: Option<String>,
    pub request_timeout: Duration,

    // Locale files
    pub locales_dir: PathBuf,
    /// Explicit cache file; defaults to `cache.json` inside `locales_dir`
    pub cache_file: Option<PathBuf>,
    pub source_language: Language,

    // Pacing
    pub chunk_size: usize,
    pub key_delay: Duration,
    pub max_retries: u32,
    pub language_pause: Duration,
}

/// Parse an optional numeric variable, falling back to `default` when unset
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} must be a number, got '{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let locales_dir = PathBuf::from(
            std::env::var("LOCALES_DIR").unwrap_or_else(|_| "locales".to_string()),
        );

        let cache_file = std::env::var("TRANSLATION_CACHE_FILE")
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        let source_language = match std::env::var("SOURCE_LANG") {
            Ok(code) => Language::from_code(code.trim()).context("SOURCE_LANG is not supported")?,
            Err(_) => Language::canonical(),
        };

        let max_retries: u32 = parse_var("TRANSLATE_MAX_RETRIES", 3)?;
        if max_retries == 0 {
            anyhow::bail!("TRANSLATE_MAX_RETRIES must be at least 1");
        }

        Ok(Self {
            // Translation backend
            translate_api_url: std::env::var("TRANSLATE_API_URL")
                .unwrap_or_else(|_| "http://localhost:5000/translate".to_string()),
            translate_api_key: std::env::var("TRANSLATE_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            request_timeout: Duration::from_secs(parse_var("TRANSLATE_TIMEOUT_SECS", 30)?),

            // Locale files
            locales_dir,
            cache_file,
            source_language,

            // Pacing
            chunk_size: parse_var("TRANSLATE_CHUNK_SIZE", 10)?,
            key_delay: Duration::from_millis(parse_var("TRANSLATE_DELAY_MS", 1000)?),
            max_retries,
            language_pause: Duration::from_millis(parse_var("TRANSLATE_LANGUAGE_PAUSE_MS", 2000)?),
        })
    }

    pub fn pipeline_options(&self, force: bool) -> PipelineOptions {
        PipelineOptions {
            source: self.source_language,
            chunk_size: self.chunk_size,
            key_delay: self.key_delay,
            language_pause: self.language_pause,
            force,
            retry: RetryConfig::new(self.max_retries, Duration::from_secs(1)),
        }
    }

    pub fn backend(&self) -> Result<HttpTranslationBackend> {
        let backend = HttpTranslationBackend::with_timeout(&self.translate_api_url, self.request_timeout)
            .context("Failed to build HTTP client")?;
        Ok(backend.with_api_key(self.translate_api_key.clone()))
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_file
            .clone()
            .unwrap_or_else(|| self.locales_dir.join(DEFAULT_CACHE_FILE))
    }

    pub fn store(&self) -> FsLocaleStore {
        FsLocaleStore::new(&self.locales_dir).with_cache_path(self.cache_path())
    }
}
