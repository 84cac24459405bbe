//! Provider-agnostic chat model types.
//!
//! Every provider in [`crate::remote`] implements [`ChatModel`], which lets
//! callers swap Gemini for OpenAI (or a scripted test double) without touching
//! the code that builds prompts or interprets replies.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions that frame the whole conversation.
    System,
    /// Input typed by the user.
    Human,
    /// Output produced by the model.
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::Human => "human",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Human, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn text(&self) -> &str {
        &self.content
    }
}

/// Generation parameters shared by all providers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub top_p: Option<f32>,
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

/// A request to a chat model: ordered turns plus generation parameters.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub config: ChatConfig,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            config: ChatConfig::default(),
        }
    }

    /// Set the sampling temperature.
    ///
    /// Classification prompts want low values (0.0-0.3) so the same utterance
    /// maps to the same action most of the time.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.config.top_p = Some(top_p);
        self
    }

    pub fn with_stop_sequences(mut self, sequences: Vec<String>) -> Self {
        self.config.stop_sequences = sequences;
        self
    }
}

/// Token accounting reported by the provider, when available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl UsageMetadata {
    pub fn new(input_tokens: usize, output_tokens: usize) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

/// The model's reply.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub message: Message,
    pub usage: Option<UsageMetadata>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ChatResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(content),
            usage: None,
            metadata: HashMap::new(),
        }
    }

    pub fn text(&self) -> &str {
        self.message.text()
    }
}

/// Core trait for chat-based language models.
///
/// Implementations must be `Send + Sync`; share them as `Arc<dyn ChatModel>`.
///
/// # Errors
///
/// Providers map HTTP status codes onto [`crate::LlmError`] so callers can
/// decide whether to retry with [`crate::LlmError::is_retryable`]:
/// - 5xx → `ServiceUnavailable`
/// - 429 → `RateLimitExceeded`
/// - 401/403 → `AuthenticationError`
/// - any other failure status → `ProviderError`
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a complete reply for the given turns.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Check whether the provider is reachable.
    async fn is_available(&self) -> Result<bool> {
        Ok(true)
    }

    /// Short provider name used in logs.
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::system("s").role, MessageRole::System);
        assert_eq!(Message::human("h").role, MessageRole::Human);
        assert_eq!(Message::assistant("a").text(), "a");
    }

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new(vec![Message::human("hi")])
            .with_temperature(0.2)
            .with_max_tokens(512);

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.config.temperature, Some(0.2));
        assert_eq!(request.config.max_tokens, Some(512));
        assert!(request.config.stop_sequences.is_empty());
    }

    #[test]
    fn test_usage_total() {
        assert_eq!(UsageMetadata::new(10, 5).total(), 15);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
