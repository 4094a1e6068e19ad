//! Shared retry policy for external calls.
//!
//! Storage and notification transport both retry transient failures with a
//! fixed delay and a bounded attempt count. This is the single place that
//! loop lives; call sites supply the retryable-error predicate.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// 3 attempts, 5s apart
    pub fn standard() -> Self {
        Self::new(3, Duration::from_secs(5))
    }

    /// Runs `op` until it succeeds, the error is not retryable, or the
    /// attempt budget is exhausted. The last error is returned as-is.
    pub async fn run<T, E, F, Fut, P>(&self, mut op: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && is_retryable(&err) => {
                    tracing::warn!("Attempt {}/{} failed: {}", attempt, self.max_attempts, err);
                    sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
