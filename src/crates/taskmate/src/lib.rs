//! # taskmate - natural-language task assistant
//!
//! Turns free-form utterances ("add a high priority task to buy milk") into
//! typed operations on a task store and a few lookup services, using a chat
//! model as the intent classifier.
//!
//! ## Pipeline
//!
//! ```text
//! utterance -> Dispatcher -> IntentClassifier (model, with retry)
//!           -> parse_action (fence stripping, schema validation)
//!           -> ToolRegistry handler -> format_result -> reply
//! ```
//!
//! - [`schema`] - the operations and their parameters; drives both the
//!   system prompt and validation
//! - [`registry`] / [`tools`] - operation to handler binding
//! - [`formatter`] - deterministic reply rendering
//! - [`classifier`] - model calls with exponential backoff
//! - [`parser`] - raw model output to [`Action`]
//! - [`dispatcher`] - the exchange state machine and conversation history
//!
//! Collaborators sit behind traits: [`store::TaskStore`] (SQLite or in-memory)
//! and [`lookup::LookupService`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taskmate::{bootstrap, ConfigLoader};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ConfigLoader::new().load().await?;
//! let mut dispatcher = bootstrap(&config).await?;
//!
//! let reply = dispatcher.handle_utterance("show my high priority tasks").await;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod bootstrap;
pub mod classifier;
pub mod config;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod lookup;
pub mod parser;
pub mod prompt;
pub mod registry;
pub mod result;
pub mod schema;
pub mod store;
pub mod tools;

pub use action::Action;
pub use bootstrap::{bootstrap, build_dispatcher, build_model, build_store};
pub use classifier::{ClassifierError, IntentClassifier};
pub use config::{ConfigLoader, ConfigOverrides, TaskmateConfig};
pub use conversation::ConversationState;
pub use dispatcher::{Dispatcher, Exchange, Stage};
pub use error::{ExchangeError, Result, TaskmateError};
pub use lookup::{LookupOutcome, LookupService, Lookups};
pub use parser::{parse_action, ParseError};
pub use registry::{Handler, HandlerError, RegistryError, ToolRegistry};
pub use result::{ToolData, ToolResult};
pub use schema::{DateFilter, Identifier, Operation, Parameters, Priority, ValidationError};
pub use store::{MemoryTaskStore, SqliteTaskStore, StoreError, TaskFilter, TaskRecord, TaskStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
