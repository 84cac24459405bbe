use super::missing_parameter;
use crate::lookup::{LookupOutcome, LookupService};
use crate::registry::{Handler, HandlerError};
use crate::result::ToolResult;
use crate::schema::{Operation, Parameters};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Runs a single-key lookup, reading the key from one parameter.
pub struct LookupHandler {
    operation: Operation,
    param: &'static str,
    service: Arc<dyn LookupService>,
}

impl LookupHandler {
    pub fn new(operation: Operation, param: &'static str, service: Arc<dyn LookupService>) -> Self {
        Self {
            operation,
            param,
            service,
        }
    }
}

#[async_trait]
impl Handler for LookupHandler {
    fn operation(&self) -> Operation {
        self.operation
    }

    async fn execute(&self, params: &Parameters) -> Result<ToolResult, HandlerError> {
        let Some(key) = params.get(self.param) else {
            return Ok(missing_parameter(self.param));
        };

        debug!(service = self.service.name(), key, "Running lookup");

        Ok(match self.service.lookup(key).await {
            LookupOutcome::Found { summary } => ToolResult::success(summary),
            LookupOutcome::NotFound { reason } => ToolResult::failure(reason),
        })
    }
}
