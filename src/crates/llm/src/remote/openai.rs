//! OpenAI client implementation.
//!
//! Uses the chat completions endpoint with JSON-object response format, which
//! keeps classification replies free of prose around the payload.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::OpenAiClient;
//! use llm::{ChatModel, ChatRequest, Message, RemoteLlmConfig};
//!
//! let config = RemoteLlmConfig::from_env(
//!     "OPENAI_API_KEY",
//!     "https://api.openai.com/v1",
//!     "gpt-4o-mini"
//! )?;
//! let client = OpenAiClient::new(config)?;
//!
//! let request = ChatRequest::new(vec![Message::human("Hello!")]);
//! let response = client.chat(request).await?;
//! ```

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use crate::model::{ChatModel, ChatRequest, ChatResponse, Message, MessageRole, UsageMetadata};
use crate::remote::{build_http_client, map_send_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// OpenAI API client.
#[derive(Clone)]
pub struct OpenAiClient {
    config: RemoteLlmConfig,
    client: Client,
    json_mode: bool,
}

impl OpenAiClient {
    /// Create a new OpenAI client with the given configuration.
    pub fn new(config: RemoteLlmConfig) -> Result<Self> {
        let client = build_http_client(config.timeout)?;
        Ok(Self {
            config,
            client,
            json_mode: false,
        })
    }

    /// Ask the API to constrain replies to a single JSON object.
    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn convert_message(&self, msg: &Message) -> OpenAiMessage {
        OpenAiMessage {
            role: match msg.role {
                MessageRole::System => "system",
                MessageRole::Human => "user",
                MessageRole::Assistant => "assistant",
            }
            .to_string(),
            content: Some(msg.content.clone()),
        }
    }

    fn build_body(&self, request: &ChatRequest) -> OpenAiRequest {
        OpenAiRequest {
            model: self.config.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| self.convert_message(m))
                .collect(),
            temperature: request.config.temperature,
            max_tokens: request.config.max_tokens,
            top_p: request.config.top_p,
            stop: if request.config.stop_sequences.is_empty() {
                None
            } else {
                Some(request.config.stop_sequences.clone())
            },
            response_format: self.json_mode.then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
            stream: false,
        }
    }

    fn convert_response(&self, openai_resp: OpenAiResponse) -> Result<ChatResponse> {
        let choice = openai_resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("OpenAI returned no choices".to_string()))?;

        let usage = openai_resp
            .usage
            .map(|u| UsageMetadata::new(u.prompt_tokens, u.completion_tokens));

        let mut metadata = HashMap::new();
        metadata.insert(
            "model".to_string(),
            serde_json::Value::String(openai_resp.model),
        );
        metadata.insert(
            "finish_reason".to_string(),
            serde_json::Value::String(choice.finish_reason.unwrap_or_default()),
        );

        Ok(ChatResponse {
            message: Message::assistant(choice.message.content.unwrap_or_default()),
            usage,
            metadata,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let req_body = self.build_body(&request);

        tracing::debug!(model = %self.config.model, turns = req_body.messages.len(), "Sending OpenAI request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&req_body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status("OpenAI", status, error_text));
        }

        let openai_resp: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        self.convert_response(openai_resp)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> OpenAiClient {
        let config = RemoteLlmConfig::new("test-key", "https://api.openai.com/v1", "gpt-4o-mini");
        OpenAiClient::new(config).unwrap()
    }

    #[test]
    fn test_message_conversion_all_roles() {
        let client = client();

        assert_eq!(client.convert_message(&Message::system("s")).role, "system");
        assert_eq!(client.convert_message(&Message::human("h")).role, "user");
        let asst = client.convert_message(&Message::assistant("Hi there!"));
        assert_eq!(asst.role, "assistant");
        assert_eq!(asst.content, Some("Hi there!".to_string()));
    }

    #[test]
    fn test_json_mode_sets_response_format() {
        let request = ChatRequest::new(vec![Message::human("Hello")]).with_temperature(0.1);

        let plain = client().build_body(&request);
        assert!(plain.response_format.is_none());

        let json = client().with_json_mode(true).build_body(&request);
        let value = serde_json::to_value(&json).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["model"], "gpt-4o-mini");
    }

    #[test]
    fn test_config_with_custom_timeout() {
        let config = RemoteLlmConfig::new("test-key", "https://api.openai.com/v1", "gpt-4")
            .with_timeout(Duration::from_secs(10));

        let client = OpenAiClient::new(config).unwrap();
        assert_eq!(client.config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_response_conversion_basic() {
        let body = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1234567890,
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello!"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let parsed: OpenAiResponse = serde_json::from_str(body).unwrap();
        let response = client().convert_response(parsed).unwrap();

        assert_eq!(response.text(), "Hello!");
        assert_eq!(response.usage, Some(UsageMetadata::new(10, 5)));
        assert_eq!(response.metadata["finish_reason"], "stop");
    }

    #[test]
    fn test_empty_choices_is_invalid_response() {
        let parsed: OpenAiResponse = serde_json::from_str(r#"{"model": "m", "choices": []}"#).unwrap();
        assert!(matches!(
            client().convert_response(parsed),
            Err(LlmError::InvalidResponse(_))
        ));
    }
}
