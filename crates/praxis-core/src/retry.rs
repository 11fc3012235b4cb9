//! Exponential backoff retry helper.
//!
//! [`retry_with_backoff`] is a pure higher-order wrapper: it keeps no state
//! outside its arguments, classifies failures through
//! [`PraxisError::retryable`], and surfaces a terminal
//! [`PraxisError::RetriesExhausted`] once the attempt budget is spent.
//! Callers that want to defer instead of fail route the exhausted error to
//! the offline queue.

use crate::error::{PraxisError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Upper bound on the random jitter added to each backoff delay.
const MAX_JITTER_MS: u64 = 250;

/// Configuration for retrying an asynchronous operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on each further attempt.
    pub base_delay: Duration,
    /// Cap applied to every computed delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10000),
        }
    }
}

/// Computes the backoff delay after a failed attempt (1-based).
///
/// `min(base × 2^(attempt-1) + jitter, cap)` with jitter uniform in
/// `[0, 250 ms)`.
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let base_ms = policy.base_delay.as_millis() as u64;
    let jitter_ms = rand::thread_rng().gen_range(0..MAX_JITTER_MS);
    let delay_ms = base_ms
        .saturating_mul(1u64 << exponent)
        .saturating_add(jitter_ms)
        .min(policy.max_delay.as_millis() as u64);
    Duration::from_millis(delay_ms)
}

/// Runs `operation` until it succeeds, fails non-retryably, or the attempt
/// budget is exhausted.
///
/// A failure with `retryable() == false` propagates immediately without any
/// backoff wait. After `max_attempts` retryable failures the last error is
/// wrapped in [`PraxisError::RetriesExhausted`].
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.retryable() => return Err(err),
            Err(err) => {
                if attempt == max_attempts {
                    return Err(PraxisError::RetriesExhausted {
                        attempts: max_attempts,
                        last: Box::new(err),
                    });
                }
                let delay = backoff_delay(policy, attempt);
                tracing::warn!(
                    "Attempt {}/{} failed, retrying in {}ms: {}",
                    attempt,
                    max_attempts,
                    delay.as_millis(),
                    err
                );
                sleep(delay).await;
            }
        }
    }

    unreachable!("retry loop always returns")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_with_backoff(&fast_policy(3), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, PraxisError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_retryable_error_makes_exactly_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> = retry_with_backoff(&fast_policy(3), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(PraxisError::api(401, "unauthorized"))
            }
        })
        .await;

        assert!(matches!(result, Err(PraxisError::Api { status: 401, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retryable_error_exhausts_attempt_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> = retry_with_backoff(&fast_policy(3), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(PraxisError::api(503, "unavailable"))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(PraxisError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, PraxisError::Api { status: 503, .. }));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_with_backoff(&fast_policy(5), move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(PraxisError::network("connection reset"))
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_backoff_delays_are_monotone_and_capped() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10000),
        };

        for attempt in 1..=8u32 {
            let delay = backoff_delay(&policy, attempt).as_millis() as u64;
            let exponential = 1000u64.saturating_mul(1 << (attempt - 1).min(16));
            // Lower bound: the exponential term (jitter only adds), upper
            // bound: exponential + jitter, both clipped by the cap.
            assert!(delay >= exponential.min(10000));
            assert!(delay <= (exponential + MAX_JITTER_MS).min(10000));
            assert!(delay <= 10000);
        }

        // Monotone until the cap flattens the curve: attempt 2 waits at
        // least as long as attempt 1 even in the worst jitter draw.
        let d1 = backoff_delay(&policy, 1).as_millis();
        let d2 = backoff_delay(&policy, 2).as_millis();
        assert!(d2 >= d1);
    }
}
