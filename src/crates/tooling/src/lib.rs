//! Tooling utilities shared across the taskmate workspace
//!
//! # Modules
//!
//! - `async_utils` - Retry with exponential backoff and timeouts for async operations
//! - `config` - Environment variable loading and `${VAR}` interpolation
//! - `logging` - Timing and secret-scrubbing helpers for tracing

pub mod async_utils;
pub mod config;
pub mod logging;

use thiserror::Error;

/// Errors that can occur in the tooling crate
#[derive(Debug, Error)]
pub enum ToolingError {
    /// The variable is set but is not valid UTF-8.
    #[error("Environment variable {key} contains invalid UTF-8")]
    EnvNotUnicode { key: String },

    /// The variable is set but does not parse as the requested type.
    #[error("Failed to parse environment variable {key}: {reason}")]
    EnvParse { key: String, reason: String },
}

/// Result type for tooling operations
pub type Result<T> = std::result::Result<T, ToolingError>;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = ToolingError::EnvParse {
            key: "TASKMATE_MAX_ATTEMPTS".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse environment variable TASKMATE_MAX_ATTEMPTS: invalid digit found in string"
        );
    }
}
