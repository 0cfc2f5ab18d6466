use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one)
    pub max_attempts: u32,
    /// Initial delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 doubles the delay each time)
    pub backoff_multiplier: f64,
    /// Wait applied after a rate-limited attempt
    pub rate_limit_cooldown: Duration,
    /// Cap on rate-limit waits per operation; `None` waits for as long as the
    /// backend keeps answering "slow down"
    pub max_rate_limit_waits: Option<u32>,
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            rate_limit_cooldown: Duration::from_secs(5),
            max_rate_limit_waits: None,
        }
    }

    /// Set the maximum delay between retries
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the backoff multiplier
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set the wait applied after a rate-limited attempt
    pub fn with_rate_limit_cooldown(mut self, cooldown: Duration) -> Self {
        self.rate_limit_cooldown = cooldown;
        self
    }

    /// Cap the number of rate-limit waits per operation
    pub fn with_max_rate_limit_waits(mut self, waits: u32) -> Self {
        self.max_rate_limit_waits = Some(waits);
        self
    }

    /// Preset: translation backend calls (3 attempts)
    /// Delays: 1s, 2s between attempts; 5s after each 429
    pub fn translation() -> Self {
        Self::new(3, Duration::from_secs(1))
    }

    /// Calculate the delay for a given attempt number (0-indexed)
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::translation()
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Transient failure: consume one attempt and back off
    Retry,
    /// Backend asked us to slow down: wait the cooldown, attempt budget untouched
    RateLimited,
    /// Permanent failure: give up immediately
    Abort,
}

/// Execute an async operation with retries
///
/// `classify` decides per error whether to retry with backoff, wait out a
/// rate limit without spending an attempt, or fail immediately.
///
/// # Arguments
/// * `config` - Retry configuration (max_attempts must be >= 1)
/// * `operation_name` - Name of the operation for logging
/// * `operation` - Async closure that returns Result<T, E>
/// * `classify` - Maps an error to a [`RetryDecision`]
///
/// # Returns
/// The result of the operation, or the last error if all retries failed
///
/// # Panics
/// Panics if `config.max_attempts` is 0
pub async fn with_retry<T, E, F, Fut, C>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    classify: C,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    C: Fn(&E) -> RetryDecision,
{
    assert!(
        config.max_attempts >= 1,
        "RetryConfig.max_attempts must be >= 1, got {}",
        config.max_attempts
    );

    let mut attempt: u32 = 0;
    let mut rate_limit_waits: u32 = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 || rate_limit_waits > 0 {
                    debug!(
                        "{}: Succeeded on attempt {}/{} ({} rate-limit waits)",
                        operation_name,
                        attempt + 1,
                        config.max_attempts,
                        rate_limit_waits
                    );
                }
                return Ok(result);
            }
            Err(e) => match classify(&e) {
                RetryDecision::Abort => {
                    debug!(
                        "{}: Error is not retryable, failing immediately: {}",
                        operation_name, e
                    );
                    return Err(e);
                }
                RetryDecision::RateLimited => {
                    if config
                        .max_rate_limit_waits
                        .is_some_and(|cap| rate_limit_waits >= cap)
                    {
                        warn!(
                            "{}: Still rate limited after {} waits, giving up: {}",
                            operation_name, rate_limit_waits, e
                        );
                        return Err(e);
                    }

                    rate_limit_waits += 1;
                    warn!(
                        "{}: Rate limited, waiting {:?} before retrying attempt {}/{}",
                        operation_name,
                        config.rate_limit_cooldown,
                        attempt + 1,
                        config.max_attempts
                    );
                    sleep(config.rate_limit_cooldown).await;
                }
                RetryDecision::Retry => {
                    let remaining = config.max_attempts - attempt - 1;
                    if remaining == 0 {
                        warn!(
                            "{}: All {} attempts failed. Last error: {}",
                            operation_name, config.max_attempts, e
                        );
                        return Err(e);
                    }

                    warn!(
                        "{}: Attempt {}/{} failed ({}), {} retries remaining",
                        operation_name,
                        attempt + 1,
                        config.max_attempts,
                        e,
                        remaining
                    );

                    attempt += 1;
                    let delay = config.delay_for_attempt(attempt);
                    debug!(
                        "{}: Retry attempt {}/{} after {:?}",
                        operation_name,
                        attempt + 1,
                        config.max_attempts,
                        delay
                    );
                    sleep(delay).await;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn always_retry(_: &&str) -> RetryDecision {
        RetryDecision::Retry
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig::new(max_attempts, Duration::from_millis(10))
            .with_rate_limit_cooldown(Duration::from_millis(5))
    }

    #[test]
    fn test_retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.rate_limit_cooldown, Duration::from_secs(5));
        assert_eq!(config.max_rate_limit_waits, None);
    }

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig::new(4, Duration::from_secs(1)).with_backoff_multiplier(2.0);

        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_respects_max() {
        let config = RetryConfig::new(10, Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(3))
            .with_backoff_multiplier(2.0);

        // Attempt 4 would be 8 seconds, but max is 3
        assert_eq!(config.delay_for_attempt(4), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_with_retry_succeeds_first_attempt() {
        let config = fast_config(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<u32, &str> = with_retry(
            &config,
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                }
            },
            always_retry,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retry_succeeds_after_failures() {
        let config = fast_config(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<u32, &str> = with_retry(
            &config,
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    let attempt = c.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err("temporary failure")
                    } else {
                        Ok(42)
                    }
                }
            },
            always_retry,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_all_attempts_fail() {
        let config = fast_config(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<u32, &str> = with_retry(
            &config,
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("permanent failure")
                }
            },
            always_retry,
        )
        .await;

        assert_eq!(result.unwrap_err(), "permanent failure");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_abort_fails_immediately() {
        let config = fast_config(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<u32, &str> = with_retry(
            &config,
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("client error 400")
                }
            },
            |e: &&str| {
                if e.contains("400") {
                    RetryDecision::Abort
                } else {
                    RetryDecision::Retry
                }
            },
        )
        .await;

        assert_eq!(result.unwrap_err(), "client error 400");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_does_not_consume_attempts() {
        // Five 429s followed by success: with only 2 attempts this must still succeed
        let config = fast_config(2);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<u32, &str> = with_retry(
            &config,
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    let call = c.fetch_add(1, Ordering::SeqCst);
                    if call < 5 {
                        Err("429 Too Many Requests")
                    } else {
                        Ok(7)
                    }
                }
            },
            |_: &&str| RetryDecision::RateLimited,
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_rate_limit_interleaved_with_failures() {
        // 429, 500, 429, 500 -> budget of 2 exhausted by the two 500s
        let config = fast_config(2);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<u32, String> = with_retry(
            &config,
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    let call = c.fetch_add(1, Ordering::SeqCst);
                    if call % 2 == 0 {
                        Err("429".to_string())
                    } else {
                        Err("500".to_string())
                    }
                }
            },
            |e: &String| {
                if e == "429" {
                    RetryDecision::RateLimited
                } else {
                    RetryDecision::Retry
                }
            },
        )
        .await;

        assert_eq!(result.unwrap_err(), "500");
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_rate_limit_cap() {
        let config = fast_config(3).with_max_rate_limit_waits(2);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<u32, &str> = with_retry(
            &config,
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("429")
                }
            },
            |_: &&str| RetryDecision::RateLimited,
        )
        .await;

        assert!(result.is_err());
        // Initial call plus one call after each of the two waits
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    #[should_panic(expected = "max_attempts must be >= 1")]
    async fn test_zero_attempts_panics() {
        let config = fast_config(0);
        let _: Result<u32, &str> = with_retry(&config, "test", || async { Ok(1) }, always_retry).await;
    }
}
