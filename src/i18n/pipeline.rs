//! Locale translation pipeline.
//!
//! One run translates the source dictionary into one target language:
//!
//! 1. load the source dictionary, the existing target (unless forced) and the cache
//! 2. flatten both dictionaries and diff them for missing keys
//! 3. resolve missing keys chunk by chunk (concurrent inside a chunk,
//!    sequential across chunks), from cache or through the backend with retry
//! 4. overlay the results on the existing target, unflatten, persist target and cache

use crate::i18n::{
    cache_key, flatten, missing_keys, unflatten, FlatDictionary, Language, LocaleStore,
    MetricsReport, TranslateError, TranslationBackend, TranslationCache, TranslationMetrics,
    TranslationValidator,
};
use crate::retry::{with_retry, RetryConfig, RetryDecision};
use anyhow::{anyhow, bail, Context, Result};
use futures::future::join_all;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Knobs for a translation run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Language of the base dictionary
    pub source: Language,
    /// Keys translated concurrently per chunk
    pub chunk_size: usize,
    /// Pause after each backend-resolved key
    pub key_delay: Duration,
    /// Pause between languages in a multi-language run
    pub language_pause: Duration,
    /// Retranslate every key, ignoring the existing target and the cache
    pub force: bool,
    pub retry: RetryConfig,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            source: Language::canonical(),
            chunk_size: 10,
            key_delay: Duration::from_millis(1000),
            language_pause: Duration::from_secs(2),
            force: false,
            retry: RetryConfig::translation(),
        }
    }
}

/// Outcome of one language run
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageReport {
    /// Language code as requested
    pub code: String,
    /// Keys that needed translation
    pub pending: usize,
    pub metrics: MetricsReport,
    /// Where the target dictionary was written; `None` when nothing was written
    pub output: Option<String>,
    /// Why the run failed
    pub error: Option<String>,
}

impl LanguageReport {
    fn failed(code: &str, metrics: MetricsReport, error: &anyhow::Error) -> Self {
        Self {
            code: code.to_string(),
            pending: 0,
            metrics,
            output: None,
            error: Some(format!("{:#}", error)),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a multi-language run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub reports: Vec<LanguageReport>,
}

impl RunSummary {
    /// Logical AND of every language's success
    pub fn all_succeeded(&self) -> bool {
        self.reports.iter().all(LanguageReport::succeeded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOutcome {
    Cached,
    Translated,
    Failed,
}

#[derive(Debug)]
struct Resolution {
    key: String,
    cache_key: String,
    value: String,
    outcome: KeyOutcome,
}

/// Drives a [`TranslationBackend`] over the dictionaries in a [`LocaleStore`].
pub struct LocaleTranslator<B, S> {
    backend: B,
    store: S,
    options: PipelineOptions,
}

impl<B, S> LocaleTranslator<B, S>
where
    B: TranslationBackend,
    S: LocaleStore,
{
    pub fn new(backend: B, store: S, options: PipelineOptions) -> Self {
        Self {
            backend,
            store,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Translate several languages one after another, pausing between them.
    ///
    /// A failed language never stops the others.
    pub async fn translate_languages<T: AsRef<str>>(&self, codes: &[T]) -> RunSummary {
        let mut summary = RunSummary::default();

        for (index, code) in codes.iter().enumerate() {
            if index > 0 && !self.options.language_pause.is_zero() {
                debug!(
                    "Pausing {:?} before next language",
                    self.options.language_pause
                );
                sleep(self.options.language_pause).await;
            }
            summary.reports.push(self.translate_language(code.as_ref()).await);
        }

        summary
    }

    /// Translate the source dictionary into one language.
    pub async fn translate_language(&self, code: &str) -> LanguageReport {
        let metrics = TranslationMetrics::new();

        let target = match self.resolve_target(code) {
            Ok(target) => target,
            Err(e) => {
                error!("Skipping '{}': {:#}", code, e);
                return LanguageReport::failed(code, metrics.report(), &e);
            }
        };

        match self.run(target, &metrics).await {
            Ok((pending, output)) => {
                let report = LanguageReport {
                    code: code.to_string(),
                    pending,
                    metrics: metrics.report(),
                    output,
                    error: None,
                };
                info!(
                    "{} ({}): translated={} cached={} failed={} api_calls={} rate_limited={}",
                    target.name(),
                    target.code(),
                    report.metrics.translated,
                    report.metrics.cached,
                    report.metrics.failed,
                    report.metrics.api_calls,
                    report.metrics.rate_limited
                );
                report
            }
            Err(e) => {
                error!("Translation to {} failed: {:#}", target.code(), e);
                LanguageReport::failed(code, metrics.report(), &e)
            }
        }
    }

    /// Gate on the allow-list before any I/O
    fn resolve_target(&self, code: &str) -> Result<Language> {
        let target = Language::from_code(code)?;
        if target == self.options.source {
            bail!(
                "Target language '{}' is the source language",
                target.code()
            );
        }
        Ok(target)
    }

    /// Returns the number of pending keys and the output location
    async fn run(
        &self,
        target: Language,
        metrics: &TranslationMetrics,
    ) -> Result<(usize, Option<String>)> {
        let source = self.options.source;
        let force = self.options.force;

        let base = self
            .store
            .read_dictionary(source)
            .await
            .context("Failed to load base dictionary")?
            .ok_or_else(|| anyhow!("Base dictionary for '{}' not found", source.code()))?;

        let existing = if force {
            None
        } else {
            self.store
                .read_dictionary(target)
                .await
                .context("Failed to load existing target dictionary")?
        };

        let mut cache = self
            .store
            .read_cache()
            .await
            .context("Failed to load translation cache")?;

        let base_flat = flatten(&base);
        let existing_flat = existing.as_ref().map(flatten).unwrap_or_default();
        let pending = missing_keys(&base_flat, &existing_flat, force);

        if pending.is_empty() {
            info!("{} is up to date, nothing to translate", target.code());
            return Ok((0, None));
        }

        let chunk_size = self.options.chunk_size.max(1);
        info!(
            "Translating {} keys {} -> {} in {} chunks",
            pending.len(),
            source.code(),
            target.code(),
            pending.len().div_ceil(chunk_size)
        );

        let mut resolved = FlatDictionary::new();
        for (index, chunk) in pending.chunks(chunk_size).enumerate() {
            debug!("Chunk {}: {} keys", index + 1, chunk.len());

            let resolutions = join_all(chunk.iter().filter_map(|key| {
                base_flat
                    .get(key)
                    .map(|value| self.resolve_key(key, value, target, &cache, metrics))
            }))
            .await;

            for resolution in resolutions {
                if resolution.outcome != KeyOutcome::Cached {
                    cache.insert(resolution.cache_key, resolution.value.clone());
                }
                resolved.insert(resolution.key, resolution.value);
            }
        }

        let mut out_flat = existing_flat;
        out_flat.extend(resolved);
        let output = unflatten(&out_flat);

        let written = self.store.write_dictionary(target, &output).await;
        let cache_written = self.store.write_cache(&cache).await;

        let location = written.context("Failed to write target dictionary")?;
        cache_written.context("Failed to write translation cache")?;

        Ok((pending.len(), Some(location)))
    }

    async fn resolve_key(
        &self,
        key: &str,
        source_value: &str,
        target: Language,
        cache: &TranslationCache,
        metrics: &TranslationMetrics,
    ) -> Resolution {
        let source = self.options.source;
        let cache_key = cache_key(key, source, target, source_value);

        if !self.options.force {
            if let Some(cached) = cache.get(&cache_key) {
                debug!("[cache] {}", key);
                metrics.record_cached();
                return Resolution {
                    key: key.to_string(),
                    value: cached.to_string(),
                    cache_key,
                    outcome: KeyOutcome::Cached,
                };
            }
        }

        let backend = &self.backend;
        let result = with_retry(
            &self.options.retry,
            &format!("Translate {} to {}", key, target.code()),
            || {
                metrics.record_api_call();
                backend.translate(source_value, source, target)
            },
            |e: &TranslateError| {
                let decision = e.retry_decision();
                if decision == RetryDecision::RateLimited {
                    metrics.record_rate_limited();
                }
                decision
            },
        )
        .await;

        let (value, outcome) = match result {
            Ok(translated) => {
                let validation = TranslationValidator::validate(source_value, &translated);
                if !validation.is_clean() {
                    metrics.record_placeholder_warning();
                    warn!(
                        "Translation of {} to {} lost markup: errors={:?} warnings={:?}",
                        key,
                        target.code(),
                        validation.errors,
                        validation.warnings
                    );
                }
                debug!("[translated] {}", key);
                metrics.record_translated();
                (translated, KeyOutcome::Translated)
            }
            Err(e) => {
                warn!(
                    "Falling back to source text for {} ({}): {}",
                    key,
                    target.code(),
                    e
                );
                metrics.record_failed();
                (source_value.to_string(), KeyOutcome::Failed)
            }
        };

        if !self.options.key_delay.is_zero() {
            sleep(self.options.key_delay).await;
        }

        Resolution {
            key: key.to_string(),
            cache_key,
            value,
            outcome,
        }
    }
}
