//! Error types for LLM provider implementations.

use thiserror::Error;

/// Result type for LLM operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when working with LLM providers.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize/deserialize data.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// API authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// API key not found in environment.
    #[error("API key not found: {0}")]
    ApiKeyNotFound(String),

    /// Provider is overloaded or down (HTTP 5xx).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded (HTTP 429).
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response body could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// General provider error.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::HttpError(e) => !e.is_builder() && !e.is_decode(),
            LlmError::ServiceUnavailable(_)
            | LlmError::Timeout(_)
            | LlmError::RateLimitExceeded(_) => true,
            _ => false,
        }
    }

    /// Check if this error is due to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            LlmError::AuthenticationError(_) | LlmError::ApiKeyNotFound(_)
        )
    }

    /// Map a non-success HTTP status from a provider onto an error.
    pub fn from_status(provider: &str, status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => LlmError::AuthenticationError(body),
            429 => LlmError::RateLimitExceeded(body),
            408 => LlmError::Timeout(body),
            400 | 404 | 422 => {
                LlmError::InvalidRequest(format!("{} API error {}: {}", provider, status, body))
            }
            s if s >= 500 => {
                LlmError::ServiceUnavailable(format!("{} API error {}: {}", provider, status, body))
            }
            _ => LlmError::ProviderError(format!("{} API error {}: {}", provider, status, body)),
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}
