//! Per-run translation counters.
//!
//! One [`TranslationMetrics`] lives for one language run. Key resolutions in
//! a chunk run concurrently and record through a shared reference, hence the
//! atomics.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Keys resolved by a backend call
    translated: AtomicUsize,

    /// Keys resolved from the cache without a backend call
    cached: AtomicUsize,

    /// Keys that fell back to the source text
    failed: AtomicUsize,

    /// Individual backend requests, retries included
    api_calls: AtomicUsize,

    /// Backend responses with status 429, including one that ends a key's
    /// retries when the wait cap is reached
    rate_limited: AtomicUsize,

    /// Translations whose placeholders or markup did not survive
    placeholder_warnings: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_translated(&self) {
        self.translated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cached(&self) {
        self.cached.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_placeholder_warning(&self) {
        self.placeholder_warnings.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters.
    pub fn report(&self) -> MetricsReport {
        let translated = self.translated.load(Ordering::Relaxed);
        let cached = self.cached.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);

        let resolved = translated + cached + failed;
        let cache_hit_rate = if resolved > 0 {
            (cached as f64 / resolved as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            translated,
            cached,
            failed,
            api_calls: self.api_calls.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            placeholder_warnings: self.placeholder_warnings.load(Ordering::Relaxed),
            cache_hit_rate,
        }
    }
}

/// Snapshot of one run's counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsReport {
    pub translated: usize,
    pub cached: usize,
    pub failed: usize,
    pub api_calls: usize,
    /// 429 responses received, not cooldown waits taken
    pub rate_limited: usize,
    pub placeholder_warnings: usize,

    /// Share of resolved keys served from cache, as a percentage (0-100)
    pub cache_hit_rate: f64,
}
