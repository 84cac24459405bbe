//! Tool registry
//!
//! Maps each [`Operation`] to the [`Handler`] that executes it. Handlers take
//! validated [`Parameters`] and return a uniform [`ToolResult`].
//!
//! Two kinds of failure are kept apart:
//! - domain failures (task not found, lookup miss) are `ToolResult`s with
//!   `success == false` and a user-facing message
//! - [`HandlerError`] means the collaborator behind the handler could not be
//!   reached at all

use crate::lookup::Lookups;
use crate::result::ToolResult;
use crate::schema::{Operation, Parameters};
use crate::store::TaskStore;
use crate::tools;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// A collaborator could not be reached while executing a handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{operation}: collaborator unavailable: {detail}")]
    Unavailable {
        operation: &'static str,
        detail: String,
    },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no handler registered for '{0}'")]
    NotFound(String),

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// Executable bound to one operation.
#[async_trait]
pub trait Handler: Send + Sync {
    fn operation(&self) -> Operation;

    async fn execute(&self, params: &Parameters) -> Result<ToolResult, HandlerError>;
}

/// Operation name to handler mapping.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: HashMap<Operation, Box<dyn Handler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a handler bound for every operation in the schema.
    pub fn standard(store: Arc<dyn TaskStore>, lookups: &Lookups) -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(tools::CreateTodo::new(store.clone())));
        registry.register(Box::new(tools::ListTodos::new(store.clone())));
        registry.register(Box::new(tools::UpdateTodo::new(store.clone())));
        registry.register(Box::new(tools::ToggleComplete::new(store.clone())));
        registry.register(Box::new(tools::DeleteTodo::new(store.clone())));
        registry.register(Box::new(tools::ReassignTodo::new(store.clone())));
        registry.register(Box::new(tools::BulkUpdateAssignee::new(store)));

        registry.register(Box::new(tools::LookupHandler::new(
            Operation::GetCurrentWeather,
            "city",
            lookups.weather.clone(),
        )));
        registry.register(Box::new(tools::LookupHandler::new(
            Operation::GetGithubProfile,
            "username",
            lookups.github.clone(),
        )));
        registry.register(Box::new(tools::LookupHandler::new(
            Operation::GetTwitterProfile,
            "username",
            lookups.twitter.clone(),
        )));
        registry.register(Box::new(tools::LookupHandler::new(
            Operation::GetCountryInfo,
            "country",
            lookups.country.clone(),
        )));

        registry
    }

    /// Bind a handler, replacing any previous one for the same operation.
    pub fn register(&mut self, handler: Box<dyn Handler>) {
        self.handlers.insert(handler.operation(), handler);
    }

    pub fn get(&self, operation: Operation) -> Option<&dyn Handler> {
        self.handlers.get(&operation).map(|h| h.as_ref())
    }

    pub fn contains(&self, operation: Operation) -> bool {
        self.handlers.contains_key(&operation)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Schema operations that have no handler bound, in schema order.
    pub fn missing_operations(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| !self.contains(*op))
            .collect()
    }

    pub async fn execute(
        &self,
        operation: Operation,
        params: &Parameters,
    ) -> Result<ToolResult, RegistryError> {
        let handler = self
            .get(operation)
            .ok_or_else(|| RegistryError::NotFound(operation.name().to_string()))?;

        Ok(handler.execute(params).await?)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().map(|op| op.name()).collect();
        names.sort_unstable();
        f.debug_struct("ToolRegistry").field("handlers", &names).finish()
    }
}
