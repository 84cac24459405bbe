//! Intent classifier client
//!
//! Sends the conversation to the chat model and returns the raw reply text.
//! Transient model failures are retried with exponential backoff; the reply
//! content is never interpreted here (see [`crate::parser`]).

use crate::conversation::ConversationState;
use llm::{ChatModel, ChatRequest, LlmError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tooling::async_utils::{retry_if, RetryError, RetryPolicy};
use tooling::logging::{sanitize_for_logging, timed, truncate_for_logging};
use tracing::debug;

/// Default sampling temperature; low to keep the output format stable.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

const LOGGED_REPLY_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Every attempt failed with a transient error.
    #[error("model unavailable after {attempts} attempts: {last_error}")]
    ServiceUnavailable {
        attempts: usize,
        last_error: LlmError,
    },

    /// The model refused the request with a non-transient error.
    #[error("model rejected request: {0}")]
    Rejected(LlmError),
}

impl From<RetryError<LlmError>> for ClassifierError {
    fn from(err: RetryError<LlmError>) -> Self {
        match err {
            RetryError::Exhausted { attempts, last } => ClassifierError::ServiceUnavailable {
                attempts,
                last_error: last,
            },
            RetryError::Aborted { error, .. } => ClassifierError::Rejected(error),
        }
    }
}

pub struct IntentClassifier {
    model: Arc<dyn ChatModel>,
    retry_policy: RetryPolicy,
    temperature: f32,
}

impl IntentClassifier {
    /// Classifier with 3 attempts and backoff starting at 2 seconds.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            retry_policy: RetryPolicy::new(3)
                .with_initial_interval(Duration::from_millis(2000))
                .with_backoff_factor(2.0),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    pub fn provider_name(&self) -> &str {
        self.model.provider_name()
    }

    /// Classify `utterance` in the context of `conversation`, returning the
    /// model's raw reply.
    pub async fn classify(
        &self,
        conversation: &ConversationState,
        utterance: &str,
    ) -> Result<String, ClassifierError> {
        let request = ChatRequest::new(conversation.request_messages(utterance))
            .with_temperature(self.temperature);

        debug!(
            provider = self.model.provider_name(),
            turns = request.messages.len(),
            "Classifying utterance"
        );

        let response = timed(
            "classify",
            retry_if(
                &self.retry_policy,
                "classify",
                |_| self.model.chat(request.clone()),
                LlmError::is_retryable,
            ),
        )
        .await?;

        let text = response.text().to_string();
        debug!(
            reply = %truncate_for_logging(&sanitize_for_logging(&text), LOGGED_REPLY_CHARS),
            input_tokens = response.usage.map(|u| u.input_tokens),
            output_tokens = response.usage.map(|u| u.output_tokens),
            "Model replied"
        );

        Ok(text)
    }
}
