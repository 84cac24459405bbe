//! Error types for taskmate
//!
//! `TaskmateError` covers startup (configuration, store, provider). Errors
//! raised while handling a single utterance are `ExchangeError`s and never
//! escape the dispatcher; each maps to a fixed reply via
//! [`ExchangeError::user_message`].

use thiserror::Error;

/// Result type alias for taskmate startup operations
pub type Result<T> = std::result::Result<T, TaskmateError>;

/// Startup and configuration errors. These are fatal for the binary.
#[derive(Debug, Error)]
pub enum TaskmateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("LLM provider error: {0}")]
    Llm(#[from] llm::LlmError),

    #[error("Lookup service error: {0}")]
    Lookup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why one exchange failed.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Blank utterance; the model is never called.
    #[error("empty utterance")]
    EmptyInput,

    /// Retries exhausted or the exchange timed out.
    #[error("classifier unavailable: {0}")]
    ServiceUnavailable(String),

    /// The model rejected the request with a non-transient error.
    #[error("classifier rejected request: {0}")]
    ClassifierRejected(String),

    /// Model output was not a JSON object.
    #[error("malformed classification: {0}")]
    MalformedClassification(String),

    /// Model output was JSON but broke the action schema.
    #[error("invalid classification: {0}")]
    InvalidClassification(String),

    /// Validated operation has no handler bound in the registry.
    #[error("no handler registered for '{0}'")]
    UnknownOperation(String),

    /// A handler could not reach its collaborator.
    #[error("collaborator failure: {0}")]
    CollaboratorFailure(String),
}

impl ExchangeError {
    /// Stable, non-technical reply shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExchangeError::EmptyInput => "Please provide a valid query.",
            ExchangeError::ServiceUnavailable(_) => {
                "The AI service is temporarily unavailable. Please try again in a few moments."
            }
            ExchangeError::ClassifierRejected(_) => {
                "I couldn't process that request. Please try again or rephrase your command."
            }
            ExchangeError::MalformedClassification(_)
            | ExchangeError::InvalidClassification(_) => {
                "I'm having trouble processing your request. Please try again in a moment."
            }
            ExchangeError::UnknownOperation(_) => {
                "I understand what you want to do, but I don't have the right tool for that. Is there something else I can help with?"
            }
            ExchangeError::CollaboratorFailure(_) => {
                "I'm having trouble connecting to the task store. Please try again in a few moments."
            }
        }
    }

    /// Short tag used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ExchangeError::EmptyInput => "empty_input",
            ExchangeError::ServiceUnavailable(_) => "service_unavailable",
            ExchangeError::ClassifierRejected(_) => "classifier_rejected",
            ExchangeError::MalformedClassification(_) => "malformed_classification",
            ExchangeError::InvalidClassification(_) => "invalid_classification",
            ExchangeError::UnknownOperation(_) => "unknown_operation",
            ExchangeError::CollaboratorFailure(_) => "collaborator_failure",
        }
    }

    /// Whether the exchange is still recorded in conversation history.
    pub fn is_recorded(&self) -> bool {
        !matches!(self, ExchangeError::EmptyInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_hide_detail() {
        let err = ExchangeError::ServiceUnavailable("503 from upstream after 3 attempts".into());
        assert!(!err.user_message().contains("503"));

        let err = ExchangeError::CollaboratorFailure("sqlite: disk I/O error".into());
        assert!(!err.user_message().contains("sqlite"));
    }

    #[test]
    fn test_malformed_and_invalid_share_reply() {
        assert_eq!(
            ExchangeError::MalformedClassification("x".into()).user_message(),
            ExchangeError::InvalidClassification("y".into()).user_message()
        );
    }

    #[test]
    fn test_empty_input_not_recorded() {
        assert!(!ExchangeError::EmptyInput.is_recorded());
        assert!(ExchangeError::UnknownOperation("x".into()).is_recorded());
    }
}
