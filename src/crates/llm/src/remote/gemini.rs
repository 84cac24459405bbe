//! Google Gemini client implementation.
//!
//! Talks to the Generative Language API (`models/{model}:generateContent`).
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::GeminiClient;
//! use llm::{ChatModel, ChatRequest, Message, RemoteLlmConfig};
//!
//! let config = RemoteLlmConfig::from_env(
//!     "GOOGLE_API_KEY",
//!     "https://generativelanguage.googleapis.com/v1beta",
//!     "gemini-1.5-flash"
//! )?;
//! let client = GeminiClient::new(config)?;
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

/// Google Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    config: RemoteLlmConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client with the given configuration.
    pub fn new(config: RemoteLlmConfig) -> Result<Self> {
        let client = build_http_client(config.timeout)?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Convert messages to Gemini contents.
    ///
    /// Gemini only knows the `user` and `model` roles, so the system turn is
    /// sent first as a user turn tagged with `[System]`.
    fn convert_messages(
        &self,
        messages: &[Message],
    ) -> (Option<GeminiSystemInstruction>, Vec<GeminiMessage>) {
        let mut contents = Vec::with_capacity(messages.len());
        let mut system: Vec<&str> = Vec::new();

        for msg in messages {
            match msg.role {
                MessageRole::System => system.push(&msg.content),
                MessageRole::Human => contents.push(GeminiMessage::new("user", &msg.content)),
                MessageRole::Assistant => contents.push(GeminiMessage::new("model", &msg.content)),
            }
        }

        let instruction = (!system.is_empty()).then(|| GeminiSystemInstruction {
            parts: vec![GeminiPart {
                text: system.join("\n\n"),
            }],
        });

        (instruction, contents)
    }

    /// Convert Gemini response to ChatResponse.
    fn convert_response(&self, gemini_resp: GeminiResponse) -> Result<ChatResponse> {
        let candidate = gemini_resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("Gemini returned no candidates".to_string()))?;

        let content_text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let usage = gemini_resp
            .usage_metadata
            .map(|u| UsageMetadata::new(u.prompt_token_count, u.candidates_token_count));

        let mut metadata = HashMap::new();
        metadata.insert(
            "model".to_string(),
            serde_json::Value::String(self.config.model.clone()),
        );
        if let Some(finish_reason) = candidate.finish_reason {
            metadata.insert(
                "finish_reason".to_string(),
                serde_json::Value::String(finish_reason),
            );
        }

        Ok(ChatResponse {
            message: Message::assistant(content_text),
            usage,
            metadata,
        })
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let generation_config = GeminiGenerationConfig {
            temperature: request.config.temperature,
            max_output_tokens: request.config.max_tokens,
            top_p: request.config.top_p,
            stop_sequences: if request.config.stop_sequences.is_empty() {
                None
            } else {
                Some(request.config.stop_sequences.clone())
            },
        };

        let (system_instruction, contents) = self.convert_messages(&request.messages);
        let req_body = GeminiRequest {
            system_instruction,
            contents,
            generation_config: Some(generation_config),
        };

        tracing::debug!(model = %self.config.model, turns = req_body.contents.len(), "Sending Gemini request");

        // Gemini takes the API key as a query parameter
        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.config.api_key)])
            .json(&req_body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status("Gemini", status, error_text));
        }

        let gemini_resp: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        self.convert_response(gemini_resp)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    contents: Vec<GeminiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiMessage {
    role: String,
    parts: Vec<GeminiPart>,
}

impl GeminiMessage {
    fn new(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![GeminiPart {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        let config = RemoteLlmConfig::new(
            "test-key",
            "https://generativelanguage.googleapis.com/v1beta",
            "gemini-1.5-flash",
        );
        GeminiClient::new(config).unwrap()
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![
            Message::system("You are helpful"),
            Message::human("Hello"),
            Message::assistant("Hi"),
        ];

        let (instruction, contents) = client().convert_messages(&messages);

        assert_eq!(instruction.unwrap().parts[0].text, "You are helpful");
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[0].parts[0].text, "Hello");
        assert_eq!(contents[1].role, "model");
    }

    #[test]
    fn test_request_body_carries_system_instruction() {
        let (system_instruction, contents) = client()
            .convert_messages(&[Message::system("Reply in JSON"), Message::human("hi")]);
        let body = serde_json::to_value(GeminiRequest {
            system_instruction,
            contents,
            generation_config: None,
        })
        .unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Reply in JSON");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_no_system_turn_omits_instruction() {
        let (instruction, contents) = client().convert_messages(&[Message::human("hi")]);
        assert!(instruction.is_none());
        assert_eq!(contents.len(), 1);
    }

    #[test]
    fn test_response_conversion() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "{\"type\":"}, {"text": "\"conversation\"}"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16}
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        let response = client().convert_response(parsed).unwrap();

        assert_eq!(response.text(), "{\"type\":\"conversation\"}");
        assert_eq!(response.usage, Some(UsageMetadata::new(12, 4)));
        assert_eq!(response.metadata["finish_reason"], "STOP");
    }

    #[test]
    fn test_empty_candidates_is_invalid_response() {
        let parsed: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let err = client().convert_response(parsed).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
