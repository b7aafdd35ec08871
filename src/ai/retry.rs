//! Retry Executor
//!
//! Bounded retry with linear backoff for model calls. Only transient
//! server-class failures (`StudyError::is_transient`) are retried; every
//! other failure, and exhaustion, re-raises the last error unchanged. The
//! executor is generic over the operation's result and never inspects or
//! transforms the success value.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::constants::retry as retry_constants;
use crate::types::Result;

/// Attempt count and backoff base for one class of operation
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum invocations of the operation (including the first)
    pub max_attempts: u32,
    /// Attempt N (1-based) sleeps N * base_delay before the next attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: retry_constants::MAX_ATTEMPTS,
            base_delay: Duration::from_millis(retry_constants::BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }
}

/// Invoke `operation` until it succeeds, fails fatally, or attempts run out.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "transient model failure, backing off"
                );
                sleep(policy.base_delay * attempt).await;
            }
            Err(err) => return Err(err),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
