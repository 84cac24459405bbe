//! Validated classifier output.

use crate::schema::{Operation, Parameters};

/// What the classifier decided to do with an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run an operation with validated parameters.
    ToolCall {
        operation: Operation,
        parameters: Parameters,
        follow_up: Option<String>,
    },
    /// Reply directly without touching any collaborator.
    Conversation {
        message: String,
        follow_up: Option<String>,
    },
}

impl Action {
    pub fn follow_up(&self) -> Option<&str> {
        match self {
            Action::ToolCall { follow_up, .. } | Action::Conversation { follow_up, .. } => {
                follow_up.as_deref()
            }
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            Action::ToolCall { operation, .. } => Some(*operation),
            Action::Conversation { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::ToolCall { .. } => "tool_calling",
            Action::Conversation { .. } => "conversation",
        }
    }
}
