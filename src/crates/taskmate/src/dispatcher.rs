//! Dispatcher
//!
//! Runs one exchange at a time through the pipeline:
//!
//! ```text
//! Idle -> AwaitingClassification -> Validating -> Executing -> Formatting -> Idle
//! ```
//!
//! Any stage can fail; the failure becomes a fixed user-facing reply (see
//! [`ExchangeError::user_message`]) and the dispatcher is ready for the next
//! utterance. Technical detail goes to the log only.

use crate::action::Action;
use crate::classifier::{ClassifierError, IntentClassifier};
use crate::conversation::ConversationState;
use crate::error::ExchangeError;
use crate::formatter::{format_conversation, format_result};
use crate::parser::parse_action;
use crate::registry::{RegistryError, ToolRegistry};
use crate::result::ToolResult;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tooling::async_utils::{with_timeout, TimeoutError};
use tracing::{debug, warn};

/// Pipeline stage of the exchange in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    AwaitingClassification,
    Validating,
    Executing,
    Formatting,
    Failed(&'static str),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => f.write_str("idle"),
            Stage::AwaitingClassification => f.write_str("awaiting_classification"),
            Stage::Validating => f.write_str("validating"),
            Stage::Executing => f.write_str("executing"),
            Stage::Formatting => f.write_str("formatting"),
            Stage::Failed(kind) => write!(f, "failed({})", kind),
        }
    }
}

/// A completed exchange.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// 1-based exchange counter.
    pub number: u64,
    pub action: Action,
    /// Handler result; `None` for conversational replies.
    pub result: Option<ToolResult>,
    pub reply: String,
}

pub struct Dispatcher {
    classifier: Arc<IntentClassifier>,
    registry: Arc<ToolRegistry>,
    conversation: ConversationState,
    exchange_timeout: Option<Duration>,
    exchanges: u64,
}

fn transition(number: u64, from: Stage, to: Stage) -> Stage {
    debug!(exchange = number, from = %from, to = %to, "Exchange stage");
    to
}

impl Dispatcher {
    pub fn new(
        classifier: Arc<IntentClassifier>,
        registry: Arc<ToolRegistry>,
        conversation: ConversationState,
    ) -> Self {
        Self {
            classifier,
            registry,
            conversation,
            exchange_timeout: None,
            exchanges: 0,
        }
    }

    /// Bound classification plus execution of one exchange.
    pub fn with_exchange_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.exchange_timeout = timeout;
        self
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Number of exchanges started so far.
    pub fn exchange_count(&self) -> u64 {
        self.exchanges
    }

    /// Handle one utterance and return the reply text. Never fails.
    pub async fn handle_utterance(&mut self, text: &str) -> String {
        match self.handle_exchange(text).await {
            Ok(exchange) => exchange.reply,
            Err(err) => err.user_message().to_string(),
        }
    }

    /// Handle one utterance, exposing the classified action and result.
    ///
    /// The exchange is recorded in the conversation on success and on every
    /// failure except empty input.
    pub async fn handle_exchange(&mut self, text: &str) -> Result<Exchange, ExchangeError> {
        let utterance = text.trim();
        if utterance.is_empty() {
            return Err(ExchangeError::EmptyInput);
        }

        self.exchanges += 1;
        let number = self.exchanges;

        let outcome = match with_timeout(self.exchange_timeout, self.run(number, utterance)).await
        {
            Ok(exchange) => Ok(exchange),
            Err(TimeoutError::OperationFailed(err)) => Err(err),
            Err(TimeoutError::Timeout(limit)) => Err(ExchangeError::ServiceUnavailable(format!(
                "exchange timed out after {:?}",
                limit
            ))),
        };

        match &outcome {
            Ok(exchange) => self.conversation.record_exchange(utterance, &exchange.reply),
            Err(err) => {
                warn!(exchange = number, kind = err.kind(), error = %err, "Exchange failed");
                transition(number, Stage::Failed(err.kind()), Stage::Idle);
                if err.is_recorded() {
                    self.conversation.record_exchange(utterance, err.user_message());
                }
            }
        }

        outcome
    }

    async fn run(&self, number: u64, utterance: &str) -> Result<Exchange, ExchangeError> {
        let stage = transition(number, Stage::Idle, Stage::AwaitingClassification);

        let raw = self
            .classifier
            .classify(&self.conversation, utterance)
            .await
            .map_err(|err| match err {
                ClassifierError::ServiceUnavailable { .. } => {
                    ExchangeError::ServiceUnavailable(err.to_string())
                }
                ClassifierError::Rejected(_) => ExchangeError::ClassifierRejected(err.to_string()),
            })?;

        let stage = transition(number, stage, Stage::Validating);

        let action = parse_action(&raw).map_err(|err| {
            if err.is_malformed() {
                ExchangeError::MalformedClassification(err.to_string())
            } else {
                ExchangeError::InvalidClassification(err.to_string())
            }
        })?;

        let (reply, result) = match &action {
            Action::ToolCall {
                operation,
                parameters,
                follow_up,
            } => {
                let stage = transition(number, stage, Stage::Executing);

                let result = self
                    .registry
                    .execute(*operation, parameters)
                    .await
                    .map_err(|err| match err {
                        RegistryError::NotFound(name) => ExchangeError::UnknownOperation(name),
                        RegistryError::Handler(e) => ExchangeError::CollaboratorFailure(e.to_string()),
                    })?;

                if let Some(detail) = &result.error_detail {
                    warn!(exchange = number, operation = %operation, detail = %detail, "Handler reported failure");
                }

                let stage = transition(number, stage, Stage::Formatting);
                let reply = format_result(*operation, &result, follow_up.as_deref());
                transition(number, stage, Stage::Idle);
                (reply, Some(result))
            }
            Action::Conversation { message, follow_up } => {
                let stage = transition(number, stage, Stage::Formatting);
                let reply = format_conversation(message, follow_up.as_deref());
                transition(number, stage, Stage::Idle);
                (reply, None)
            }
        };

        Ok(Exchange {
            number,
            action,
            result,
            reply,
        })
    }

    /// Clear the conversation history.
    pub fn reset(&mut self) {
        self.conversation.reset();
        debug!("Conversation reset");
    }
}
