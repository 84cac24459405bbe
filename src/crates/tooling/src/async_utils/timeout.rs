//! Timeout wrapper for async operations

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout as tokio_timeout;

/// Execute an async operation with an optional upper bound.
///
/// `None` runs the operation unbounded.
///
/// # Example
///
/// ```rust,ignore
/// use tooling::async_utils::timeout::with_timeout;
/// use std::time::Duration;
///
/// let result = with_timeout(Some(Duration::from_secs(1)), slow_operation()).await;
/// assert!(result.is_err());
/// ```
pub async fn with_timeout<F, T, E>(
    duration: Option<Duration>,
    operation: F,
) -> std::result::Result<T, TimeoutError<E>>
where
    F: Future<Output = std::result::Result<T, E>>,
{
    let outcome = match duration {
        Some(limit) => match tokio_timeout(limit, operation).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => return Err(TimeoutError::Timeout(limit)),
        },
        None => operation.await,
    };

    outcome.map_err(TimeoutError::OperationFailed)
}

/// Error type for timeout operations
#[derive(Debug)]
pub enum TimeoutError<E> {
    /// Operation completed but failed
    OperationFailed(E),
    /// Operation timed out
    Timeout(Duration),
}

impl<E: std::fmt::Display> std::fmt::Display for TimeoutError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutError::OperationFailed(e) => write!(f, "Operation failed: {}", e),
            TimeoutError::Timeout(d) => write!(f, "Operation timed out after {:?}", d),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TimeoutError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimeoutError::OperationFailed(e) => Some(e),
            TimeoutError::Timeout(_) => None,
        }
    }
}
