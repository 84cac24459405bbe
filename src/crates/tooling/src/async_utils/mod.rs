//! Async utilities for common async patterns
//!
//! - Retry with exponential backoff for transient failures
//! - Optional timeouts around a whole operation
//!
//! # Example
//!
//! ```rust,ignore
//! use tooling::async_utils::retry::{retry_if, RetryPolicy};
//! use tooling::async_utils::timeout::with_timeout;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3).with_initial_interval(Duration::from_secs(2));
//! let reply = with_timeout(Some(Duration::from_secs(90)), async {
//!     retry_if(&policy, "classify", |_| call_model(), |e| e.is_retryable()).await
//! })
//! .await;
//! ```

pub mod retry;
pub mod timeout;

pub use retry::{retry_if, with_retry, RetryError, RetryPolicy};
pub use timeout::{with_timeout, TimeoutError};
