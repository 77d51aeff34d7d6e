//! Retry policy applied at the transport boundary
//!
//! A policy is a plain value: a maximum number of attempts and a predicate
//! deciding which errors are worth another attempt. The transport owns one and
//! runs each request through it; nothing in the measurement core retries on
//! its own. Attempts follow each other without a delay.

use super::AppError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type RetryPredicate = Arc<dyn Fn(&AppError) -> bool + Send + Sync>;

/// Bounded retry policy parameterized by attempt count and error predicate
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    retryable: RetryPredicate,
}

impl RetryPolicy {
    /// Create a policy from an attempt budget and a retryable-error predicate.
    ///
    /// `max_attempts` counts the first try, so `1` means "never retry".
    /// Zero is treated as one.
    pub fn new<P>(max_attempts: u32, retryable: P) -> Self
    where
        P: Fn(&AppError) -> bool + Send + Sync + 'static,
    {
        Self {
            max_attempts: max_attempts.max(1),
            retryable: Arc::new(retryable),
        }
    }

    /// A policy that performs exactly one attempt
    pub fn none() -> Self {
        Self::new(1, |_| false)
    }

    /// Retry transient transport failures (see [`AppError::is_recoverable`])
    pub fn transient(max_attempts: u32) -> Self {
        Self::new(max_attempts, AppError::is_recoverable)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether `error` would be retried by this policy
    pub fn should_retry(&self, error: &AppError, attempt: u32) -> bool {
        attempt < self.max_attempts && (self.retryable)(error)
    }

    /// Run `operation` until it succeeds, the error is not retryable, or the
    /// attempt budget is spent. The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if self.should_retry(&error, attempt) => attempt += 1,
                Err(error) => return Err(error),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
