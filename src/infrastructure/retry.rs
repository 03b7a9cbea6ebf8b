use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::models::RetryConfig;

/// Bounded retry policy with exponential backoff.
///
/// Wraps calls to generation collaborators. Every error is treated as
/// transient; the caller decides what an exhausted policy means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first call included
    max_attempts: u32,
    /// Initial backoff duration in milliseconds
    initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    max_backoff_ms: u64,
}

/// Error returned once every attempt has failed.
#[derive(Debug, thiserror::Error)]
#[error("gave up after {attempts} attempts: {source}")]
pub struct RetryExhausted {
    pub attempts: u32,
    #[source]
    pub source: anyhow::Error,
}

impl RetryPolicy {
    /// Create a new retry policy.
    ///
    /// Values are clamped so that at least one attempt is made and the
    /// maximum backoff is never below the initial one.
    ///
    /// # Example
    /// ```
    /// use bilan_engine::infrastructure::retry::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(3, 500, 8_000);
    /// assert_eq!(policy.max_attempts(), 3);
    /// ```
    pub fn new(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff_ms,
            max_backoff_ms: max_backoff_ms.max(initial_backoff_ms),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds or the attempts are exhausted.
    ///
    /// # Example
    /// ```no_run
    /// # use bilan_engine::infrastructure::retry::{RetryExhausted, RetryPolicy};
    /// # async fn example() -> Result<u32, RetryExhausted> {
    /// let policy = RetryPolicy::new(3, 500, 8_000);
    /// let value = policy.execute(|| async { Ok(42) }).await?;
    /// # Ok(value)
    /// # }
    /// ```
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, RetryExhausted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "operation succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        warn!(attempts = attempt, error = %err, "operation failed, giving up");
                        return Err(RetryExhausted {
                            attempts: attempt,
                            source: err,
                        });
                    }

                    let backoff = self.calculate_backoff(attempt - 1);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "attempt failed, retrying"
                    );
                    sleep(backoff).await;
                }
            }
        }
    }

    /// Formula: min(initial_backoff * 2^retry, max_backoff)
    fn calculate_backoff(&self, retry: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(retry))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
