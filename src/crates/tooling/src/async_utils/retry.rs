//! Retry utilities for async operations
//!
//! Exponential backoff with an optional jitter factor. Only errors the caller
//! classifies as transient are retried; anything else aborts immediately.

use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Configuration for retrying failed operations
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: usize,

    /// Delay before the first retry
    pub initial_interval: Duration,

    /// Multiplier for the interval after each retry
    pub backoff_factor: f64,

    /// Upper bound for any single delay
    pub max_interval: Duration,

    /// Whether to scale delays by a random factor in `0.5..=1.5`
    pub jitter: bool,
}

impl RetryPolicy {
    /// Create a new retry policy with the given max attempts
    ///
    /// # Example
    ///
    /// ```rust
    /// use tooling::async_utils::retry::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(3);
    /// assert_eq!(policy.max_attempts, 3);
    /// ```
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_interval: Duration::from_millis(2000),
            backoff_factor: 2.0,
            max_interval: Duration::from_secs(30),
            jitter: false,
        }
    }

    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retry number `retry` (0-indexed).
    ///
    /// `initial_interval * backoff_factor ^ retry`, capped at `max_interval`.
    pub fn calculate_delay(&self, retry: usize) -> Duration {
        let base_nanos =
            self.initial_interval.as_nanos() as f64 * self.backoff_factor.powi(retry as i32);
        let capped_nanos = base_nanos.min(self.max_interval.as_nanos() as f64);

        let final_nanos = if self.jitter {
            let jitter_factor = rand::thread_rng().gen_range(0.5..=1.5);
            capped_nanos * jitter_factor
        } else {
            capped_nanos
        };

        Duration::from_nanos(final_nanos.round().max(0.0) as u64)
    }

    /// Check if another attempt is allowed after `attempts` have been made
    pub fn should_retry(&self, attempts: usize) -> bool {
        attempts < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Why a retried operation gave up.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed with a transient error.
    Exhausted { attempts: usize, last: E },
    /// A non-transient error stopped the loop.
    Aborted { attempt: usize, error: E },
}

impl<E> RetryError<E> {
    /// The error from the final attempt.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Aborted { error, .. } => error,
        }
    }

    pub fn attempts(&self) -> usize {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Aborted { attempt, .. } => *attempt,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryError::Exhausted { attempts, last } => {
                write!(f, "gave up after {} attempts: {}", attempts, last)
            }
            RetryError::Aborted { attempt, error } => {
                write!(f, "attempt {} failed permanently: {}", attempt, error)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetryError::Exhausted { last, .. } => Some(last),
            RetryError::Aborted { error, .. } => Some(error),
        }
    }
}

/// Execute an async operation, retrying errors for which `is_transient` holds.
///
/// The operation receives the 1-based attempt number. Waits use
/// `tokio::time::sleep`, so a paused test clock observes them exactly.
///
/// # Example
///
/// ```rust,ignore
/// use tooling::async_utils::retry::{retry_if, RetryPolicy};
///
/// let policy = RetryPolicy::new(3);
/// let reply = retry_if(&policy, "classify", |_| model.chat(request.clone()), |e| e.is_retryable()).await?;
/// ```
pub async fn retry_if<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
    is_transient: P,
) -> std::result::Result<T, RetryError<E>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(
                        operation = operation_name,
                        attempt = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(error) if !is_transient(&error) => {
                tracing::debug!(
                    operation = operation_name,
                    attempt = attempt,
                    error = %error,
                    "Permanent error, not retrying"
                );
                return Err(RetryError::Aborted { attempt, error });
            }
            Err(error) => {
                if !policy.should_retry(attempt) {
                    tracing::warn!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %error,
                        "Max retry attempts exhausted"
                    );
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: error,
                    });
                }

                let delay = policy.calculate_delay(attempt - 1);
                tracing::warn!(
                    operation = operation_name,
                    attempt = attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Transient error, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Execute an async operation, retrying every error.
pub async fn with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_name: &str,
    operation: F,
) -> std::result::Result<T, RetryError<E>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    retry_if(policy, operation_name, operation, |_| true).await
}
