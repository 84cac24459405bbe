//! Handlers bound into the [`ToolRegistry`](crate::registry::ToolRegistry).

mod lookup;
mod todo;

pub use lookup::LookupHandler;
pub use todo::{
    BulkUpdateAssignee, CreateTodo, DeleteTodo, ListTodos, ReassignTodo, ToggleComplete,
    UpdateTodo,
};

use crate::result::ToolResult;

/// Result for a parameter the validator should already have guaranteed.
fn missing_parameter(name: &str) -> ToolResult {
    ToolResult::failure(format!("Missing required parameter: {}", name))
}
