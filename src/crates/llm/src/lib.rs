//! Chat model abstraction and remote LLM providers for taskmate.
//!
//! The [`ChatModel`] trait is the only thing the rest of the workspace
//! depends on; the concrete clients in [`remote`] translate it to a
//! provider's HTTP API.
//!
//! # Remote Providers
//!
//! - **Gemini** - Google's Gemini models via the Generative Language API
//! - **OpenAI** - OpenAI chat completion models
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use llm::remote::GeminiClient;
//! use llm::{ChatModel, ChatRequest, Message, RemoteLlmConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RemoteLlmConfig::from_env(
//!         "GOOGLE_API_KEY",
//!         "https://generativelanguage.googleapis.com/v1beta",
//!         "gemini-1.5-flash",
//!     )?;
//!     let client = GeminiClient::new(config)?;
//!
//!     let request = ChatRequest::new(vec![
//!         Message::system("Reply with a single JSON object."),
//!         Message::human("add a task to buy milk"),
//!     ])
//!     .with_temperature(0.2);
//!
//!     let response = client.chat(request).await?;
//!     println!("{}", response.text());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod remote;

pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};
pub use model::{
    ChatConfig, ChatModel, ChatRequest, ChatResponse, Message, MessageRole, UsageMetadata,
};
