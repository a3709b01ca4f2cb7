//! Retry logic for transient upstream failures
//!
//! Provides retry with capped exponential backoff and jitter. Backoff
//! settings live in an explicit [`RetryConfig`] instead of being spread
//! through each caller's control flow.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Exponential backoff window: `min(base * 2^attempt, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Backoff {
    pub const fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_millis(max_ms),
        }
    }

    /// Delay before retrying after the 0-based `attempt`, without jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// Upper bound of the uniform random delay added to each backoff.
    pub jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Backoff::new(2_000, 10_000),
            jitter: Duration::ZERO,
        }
    }
}

impl RetryConfig {
    /// Delay before the next attempt, honouring an error-specific window.
    pub fn delay_for(&self, attempt: u32, window: Option<Backoff>) -> Duration {
        let base = window.unwrap_or(self.backoff).delay(attempt);
        base + jitter(self.jitter)
    }
}

/// Random duration in `[0, max)`.
pub fn jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    let ms = rand::thread_rng().gen_range(0..max.as_millis().max(1) as u64);
    Duration::from_millis(ms)
}

/// Errors that know whether another attempt may succeed.
pub trait Retriable {
    fn is_retriable(&self) -> bool;

    /// Backoff window to use instead of the config's default.
    fn backoff_override(&self) -> Option<Backoff> {
        None
    }
}

/// Execute an operation, retrying transient failures.
///
/// # Example
/// ```ignore
/// let payload = execute_with_retry(&RetryConfig::default(), "commentary", || async {
///     client.fetch_commentary_once(&url).await
/// })
/// .await?;
/// ```
pub async fn execute_with_retry<F, Fut, T, E>(config: &RetryConfig, label: &str, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retriable + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt + 1 < max_attempts && e.is_retriable() => {
                let delay = config.delay_for(attempt, e.backoff_override());
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:.1}s",
                    label,
                    attempt + 1,
                    max_attempts,
                    e,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct TestError {
        retriable: bool,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "test error (retriable={})", self.retriable)
        }
    }

    impl Retriable for TestError {
        fn is_retriable(&self) -> bool {
            self.retriable
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            backoff: Backoff::new(1, 2),
            jitter: Duration::ZERO,
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        let b = Backoff::new(2_000, 10_000);
        assert_eq!(b.delay(0), Duration::from_secs(2));
        assert_eq!(b.delay(1), Duration::from_secs(4));
        assert_eq!(b.delay(2), Duration::from_secs(8));
        assert_eq!(b.delay(3), Duration::from_secs(10));
        assert_eq!(b.delay(40), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_bounds() {
        assert_eq!(jitter(Duration::ZERO), Duration::ZERO);
        for _ in 0..100 {
            assert!(jitter(Duration::from_millis(50)) < Duration::from_millis(50));
        }
    }

    #[test]
    fn test_delay_for_uses_override() {
        let config = RetryConfig::default();
        let window = Some(Backoff::new(5_000, 30_000));
        assert_eq!(config.delay_for(0, window), Duration::from_secs(5));
        assert_eq!(config.delay_for(3, window), Duration::from_secs(30));
        assert_eq!(config.delay_for(0, None), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_retry_succeeds_eventually() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result: Result<i32, TestError> = execute_with_retry(&fast_config(3), "test", || {
            let count = attempt_count_clone.clone();
            async move {
                let current = count.fetch_add(1, Ordering::SeqCst) + 1;
                if current < 3 {
                    Err(TestError { retriable: true })
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_fails_after_max_attempts() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result: Result<i32, TestError> = execute_with_retry(&fast_config(5), "test", || {
            let count = attempt_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err(TestError { retriable: true })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempt_count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_no_retry_on_non_retriable_error() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result: Result<i32, TestError> = execute_with_retry(&fast_config(3), "test", || {
            let count = attempt_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err(TestError { retriable: false })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1); // Should not retry
    }

    #[tokio::test]
    async fn test_zero_attempts_still_calls_once() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let _: Result<i32, TestError> = execute_with_retry(&fast_config(0), "test", || {
            let count = attempt_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err(TestError { retriable: true })
            }
        })
        .await;

        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }
}
