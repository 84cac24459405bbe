//! Remote LLM provider implementations.
//!
//! # Providers
//!
//! - **Gemini** - Google's Gemini models
//! - **OpenAI** - OpenAI chat completion models

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use crate::error::{LlmError, Result};
use reqwest::Client;
use std::time::Duration;

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Transport failures before any status line arrived.
pub(crate) fn map_send_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout(err.to_string())
    } else {
        LlmError::HttpError(err)
    }
}
