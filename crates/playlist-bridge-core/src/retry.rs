//! Bounded exponential backoff around port calls

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PortError;
use crate::port::RateLimiter;

/// How often and how patiently a failing port call is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff_ms: u64,
    /// Upper bound for any single delay
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// Policy that gives up after the first failure
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (1-based), doubling each time
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

/// Run `call` with a per-attempt timeout, retrying transient failures
///
/// A timed-out attempt counts as [`PortError::Timeout`]. Non-retryable
/// errors return immediately; retryable ones are returned once the policy
/// is exhausted. A platform-provided `retry_after` stretches the delay.
///
/// Each attempt first waits on `limiter`, outside the timeout.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    call_timeout: Duration,
    limiter: Option<&RateLimiter>,
    operation: &str,
    mut call: F,
) -> Result<T, PortError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PortError>>,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        if let Some(limiter) = limiter {
            limiter.acquire().await;
        }

        let outcome = match tokio::time::timeout(call_timeout, call()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(PortError::Timeout),
        };

        match outcome {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(operation, attempt, "Call succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) if attempt > policy.max_retries => {
                tracing::warn!(operation, attempt, error = %err, "Giving up after retries");
                return Err(err);
            }
            Err(err) => {
                let delay = policy
                    .backoff(attempt)
                    .max(err.retry_after().unwrap_or_default());
                tracing::warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(3), Duration::from_millis(2_000));
        assert_eq!(policy.backoff(5), Duration::from_millis(8_000));
        assert_eq!(policy.backoff(40), Duration::from_millis(8_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::default(), Duration::from_secs(5), None, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(PortError::Unavailable("503".to_string()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            with_retry(&RetryPolicy::default(), Duration::from_secs(5), None, "test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(PortError::RateLimited { retry_after: None }) }
            })
            .await;

        assert_eq!(result, Err(PortError::RateLimited { retry_after: None }));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            with_retry(&RetryPolicy::default(), Duration::from_secs(5), None, "test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(PortError::AuthExpired) }
            })
            .await;

        assert_eq!(result, Err(PortError::AuthExpired));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let policy = RetryPolicy::none();
        let start = Instant::now();
        let result: Result<(), _> = with_retry(&policy, Duration::from_secs(2), None, "test", || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        assert_eq!(result, Err(PortError::Timeout));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_extends_delay() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let result = with_retry(&RetryPolicy::default(), Duration::from_secs(5), None, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(PortError::RateLimited {
                        retry_after: Some(Duration::from_secs(30)),
                    })
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_wait_does_not_count_against_timeout() {
        // Each slot after the first takes 200ms of wall time, four times the timeout
        let limiter = RateLimiter::new(1, 5.0);
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let result = with_retry(
                &RetryPolicy::none(),
                Duration::from_millis(50),
                Some(&limiter),
                "test",
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, PortError>(()) }
                },
            )
            .await;
            assert_eq!(result, Ok(()));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
