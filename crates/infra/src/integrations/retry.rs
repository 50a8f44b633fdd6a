//! Bounded retry for single HTTP requests
//!
//! Only failures whose [`FetchError::should_retry`] holds are retried, with
//! exponential backoff. Everything else surfaces on the first attempt and the
//! pollers pick it up on their next interval.

use std::future::Future;
use std::time::Duration;

use notifier_domain::constants::{FETCH_RETRY_ATTEMPTS, FETCH_RETRY_BACKOFF_MS};
use tracing::warn;

use super::error::{FetchError, FetchResult};

/// Retry settings for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; at least one is always made.
    pub max_attempts: u32,
    /// Delay before the second attempt, doubled for each further attempt.
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self { max_attempts, base_backoff }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    /// Runs `request` until it succeeds, fails permanently or the attempts run out.
    pub async fn run<T, F, Fut>(&self, what: &str, mut request: F) -> FetchResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FetchResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match request().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let retryable = err.should_retry();
                    warn!(
                        request = what,
                        attempt,
                        max_attempts,
                        category = ?err.category(),
                        retryable,
                        error = %err,
                        "HTTP request failed"
                    );
                    if !retryable || attempt >= max_attempts {
                        return Err(err);
                    }
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(FETCH_RETRY_ATTEMPTS, Duration::from_millis(FETCH_RETRY_BACKOFF_MS))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use reqwest::StatusCode;

    use super::*;

    fn server_error() -> FetchError {
        FetchError::from_status(StatusCode::BAD_GATEWAY, "https://api.example.com")
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn retryable_failure_is_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::default()
            .run("test", || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(server_error())
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_stop_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: FetchResult<()> = RetryPolicy::new(3, Duration::from_secs(1))
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(server_error())
            })
            .await;

        assert!(matches!(result, Err(FetchError::Status { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: FetchResult<()> = RetryPolicy::default()
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::from_status(StatusCode::UNAUTHORIZED, "https://api.example.com"))
            })
            .await;

        assert!(matches!(result, Err(FetchError::Auth { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
