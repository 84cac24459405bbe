//! Task handlers over a [`TaskStore`].

use super::missing_parameter;
use crate::registry::{Handler, HandlerError};
use crate::result::ToolResult;
use crate::schema::{Identifier, Operation, Parameters};
use crate::store::{NewTask, StoreError, TaskFilter, TaskStore, TaskUpdate};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Declare a handler struct that holds the shared task store.
macro_rules! store_handler {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name {
            store: Arc<dyn TaskStore>,
        }

        impl $name {
            pub fn new(store: Arc<dyn TaskStore>) -> Self {
                Self { store }
            }
        }
    };
}

store_handler!(CreateTodo);
store_handler!(
    /// Filtered listing, newest first.
    ListTodos
);
store_handler!(UpdateTodo);
store_handler!(ToggleComplete);
store_handler!(DeleteTodo);
store_handler!(ReassignTodo);
store_handler!(
    /// Reassign every task matching an optional filter.
    BulkUpdateAssignee
);

/// Unreachable store is a handler error; any other store failure is reported
/// to the user as a failed result.
fn store_failure(
    operation: Operation,
    verb: &str,
    err: StoreError,
) -> Result<ToolResult, HandlerError> {
    if err.is_unavailable() {
        return Err(HandlerError::Unavailable {
            operation: operation.name(),
            detail: err.to_string(),
        });
    }

    warn!(operation = operation.name(), error = %err, "Task store operation failed");
    Ok(ToolResult::failure(format!("Failed to {}", verb)).with_error_detail(err.to_string()))
}

fn not_found(identifier: &Identifier) -> ToolResult {
    ToolResult::failure(format!("Todo not found: {}", identifier))
}

#[async_trait]
impl Handler for CreateTodo {
    fn operation(&self) -> Operation {
        Operation::CreateTodo
    }

    async fn execute(&self, params: &Parameters) -> Result<ToolResult, HandlerError> {
        let Some(title) = params.get("title") else {
            return Ok(missing_parameter("title"));
        };

        let mut task = NewTask::new(title);
        if let Some(priority) = params.priority("priority") {
            task = task.with_priority(priority);
        }
        if let Some(assignee) = params.get("assignee") {
            task = task.with_assignee(assignee);
        }

        match self.store.create(task).await {
            Ok(record) => {
                info!(id = %record.id, "Created task");
                let message = format!(
                    "Added: {} ({} priority) - Assigned to: {}",
                    record.title, record.priority, record.assignee
                );
                Ok(ToolResult::success(message).with_record(record))
            }
            Err(e) => store_failure(self.operation(), "create todo", e),
        }
    }
}

#[async_trait]
impl Handler for ListTodos {
    fn operation(&self) -> Operation {
        Operation::GetAllTodos
    }

    async fn execute(&self, params: &Parameters) -> Result<ToolResult, HandlerError> {
        let filter = TaskFilter {
            search_term: params.get("searchTerm").map(str::to_string),
            priority: params.priority("priority"),
            date_filter: params.date_filter("dateFilter"),
            assignee: params.get("assignee").map(str::to_string),
        };

        match self.store.list(&filter).await {
            Ok(records) if records.is_empty() => {
                Ok(ToolResult::success("No todos found").with_records(records))
            }
            Ok(records) => {
                let count = records.len();
                let message = format!(
                    "Found {} todo{}",
                    count,
                    if count == 1 { "" } else { "s" }
                );
                Ok(ToolResult::success(message).with_records(records))
            }
            Err(e) => store_failure(self.operation(), "list todos", e),
        }
    }
}

#[async_trait]
impl Handler for UpdateTodo {
    fn operation(&self) -> Operation {
        Operation::UpdateTodo
    }

    async fn execute(&self, params: &Parameters) -> Result<ToolResult, HandlerError> {
        let Some(identifier) = params.identifier("identifier") else {
            return Ok(missing_parameter("identifier"));
        };

        let changes = TaskUpdate {
            title: params.get("newTitle").map(str::to_string),
            priority: params.priority("priority"),
            assignee: params.get("assignee").map(str::to_string),
        };
        if changes.is_empty() {
            return Ok(ToolResult::failure(format!(
                "Nothing to update for: {}",
                identifier
            )));
        }

        match self.store.update(&identifier, changes).await {
            Ok(Some(record)) => {
                let message = format!(
                    "Updated: {} ({} priority) - Assigned to: {}",
                    record.title, record.priority, record.assignee
                );
                Ok(ToolResult::success(message).with_record(record))
            }
            Ok(None) => Ok(not_found(&identifier)),
            Err(e) => store_failure(self.operation(), "update todo", e),
        }
    }
}

#[async_trait]
impl Handler for ToggleComplete {
    fn operation(&self) -> Operation {
        Operation::ToggleComplete
    }

    async fn execute(&self, params: &Parameters) -> Result<ToolResult, HandlerError> {
        let Some(identifier) = params.identifier("identifier") else {
            return Ok(missing_parameter("identifier"));
        };

        match self.store.toggle_complete(&identifier).await {
            Ok(Some(record)) => {
                let state = if record.completed { "completed" } else { "pending" };
                let message = format!("Marked as {}: {}", state, record.title);
                Ok(ToolResult::success(message).with_record(record))
            }
            Ok(None) => Ok(not_found(&identifier)),
            Err(e) => store_failure(self.operation(), "toggle todo", e),
        }
    }
}

#[async_trait]
impl Handler for DeleteTodo {
    fn operation(&self) -> Operation {
        Operation::DeleteTodo
    }

    async fn execute(&self, params: &Parameters) -> Result<ToolResult, HandlerError> {
        let Some(identifier) = params.identifier("identifier") else {
            return Ok(missing_parameter("identifier"));
        };

        match self.store.delete(&identifier).await {
            Ok(Some(record)) => {
                info!(id = %record.id, "Deleted task");
                let message = format!("Deleted: {}", record.title);
                Ok(ToolResult::success(message).with_record(record))
            }
            Ok(None) => Ok(not_found(&identifier)),
            Err(e) => store_failure(self.operation(), "delete todo", e),
        }
    }
}

#[async_trait]
impl Handler for ReassignTodo {
    fn operation(&self) -> Operation {
        Operation::ReassignTodo
    }

    async fn execute(&self, params: &Parameters) -> Result<ToolResult, HandlerError> {
        let Some(identifier) = params.identifier("identifier") else {
            return Ok(missing_parameter("identifier"));
        };
        let Some(new_assignee) = params.get("newAssignee") else {
            return Ok(missing_parameter("newAssignee"));
        };

        let changes = TaskUpdate {
            assignee: Some(new_assignee.to_string()),
            ..TaskUpdate::default()
        };

        match self.store.update(&identifier, changes).await {
            Ok(Some(record)) => {
                let message = format!(
                    "Reassigned: {} - Assigned to: {}",
                    record.title, record.assignee
                );
                Ok(ToolResult::success(message).with_record(record))
            }
            Ok(None) => Ok(not_found(&identifier)),
            Err(e) => store_failure(self.operation(), "reassign todo", e),
        }
    }
}

#[async_trait]
impl Handler for BulkUpdateAssignee {
    fn operation(&self) -> Operation {
        Operation::BulkUpdateAssignee
    }

    async fn execute(&self, params: &Parameters) -> Result<ToolResult, HandlerError> {
        let Some(new_assignee) = params.get("newAssignee") else {
            return Ok(missing_parameter("newAssignee"));
        };

        let filter = TaskFilter {
            search_term: params.get("searchTerm").map(str::to_string),
            priority: params.priority("priority"),
            date_filter: None,
            assignee: params.get("currentAssignee").map(str::to_string),
        };

        match self.store.bulk_update_assignee(new_assignee, &filter).await {
            Ok(0) => Ok(ToolResult::failure("No matching todos found to reassign")),
            Ok(count) => {
                info!(count, assignee = new_assignee, "Reassigned tasks");
                Ok(ToolResult::success(format!(
                    "Reassigned {} todo(s) to {}",
                    count, new_assignee
                )))
            }
            Err(e) => store_failure(self.operation(), "reassign todos", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ToolData;
    use crate::schema::Priority;
    use crate::store::{MemoryTaskStore, TaskRecord};

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs.iter().copied().collect()
    }

    fn store() -> Arc<dyn TaskStore> {
        Arc::new(MemoryTaskStore::new())
    }

    #[tokio::test]
    async fn test_create_message() {
        let handler = CreateTodo::new(store());
        let result = handler
            .execute(&params(&[
                ("title", "buy milk"),
                ("priority", "high"),
                ("assignee", "Unassigned"),
            ]))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(
            result.message,
            "Added: buy milk (high priority) - Assigned to: Unassigned"
        );
        assert!(matches!(result.data, ToolData::One(ref r) if r.priority == Priority::High));
    }

    #[tokio::test]
    async fn test_list_empty_and_counts() {
        let store = store();
        let list = ListTodos::new(store.clone());

        let empty = list.execute(&Parameters::new()).await.unwrap();
        assert_eq!(empty.message, "No todos found");
        assert_eq!(empty.data, ToolData::Many(Vec::new()));

        store.create(NewTask::new("one")).await.unwrap();
        let single = list.execute(&Parameters::new()).await.unwrap();
        assert_eq!(single.message, "Found 1 todo");

        store.create(NewTask::new("two")).await.unwrap();
        let many = list.execute(&Parameters::new()).await.unwrap();
        assert_eq!(many.message, "Found 2 todos");
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let store = store();
        store.create(NewTask::new("Write report")).await.unwrap();
        let toggle = ToggleComplete::new(store.clone());
        let p = params(&[("identifier", "write report")]);

        let first = toggle.execute(&p).await.unwrap();
        assert_eq!(first.message, "Marked as completed: Write report");
        let second = toggle.execute(&p).await.unwrap();
        assert_eq!(second.message, "Marked as pending: Write report");

        let ToolData::One(record) = second.data else {
            panic!("expected a record");
        };
        assert!(!record.completed);
    }

    #[tokio::test]
    async fn test_update_nothing_and_not_found() {
        let store = store();
        store.create(NewTask::new("Laundry")).await.unwrap();
        let update = UpdateTodo::new(store);

        let nothing = update
            .execute(&params(&[("identifier", "Laundry")]))
            .await
            .unwrap();
        assert!(!nothing.success);
        assert_eq!(nothing.message, "Nothing to update for: Laundry");

        let missing = update
            .execute(&params(&[("identifier", "Dishes"), ("priority", "low")]))
            .await
            .unwrap();
        assert_eq!(missing.message, "Todo not found: Dishes");
    }

    #[tokio::test]
    async fn test_reassign_and_bulk() {
        let store = store();
        store
            .create(NewTask::new("a").with_assignee("Sam"))
            .await
            .unwrap();
        store
            .create(NewTask::new("b").with_assignee("sam"))
            .await
            .unwrap();

        let reassign = ReassignTodo::new(store.clone());
        let result = reassign
            .execute(&params(&[("identifier", "a"), ("newAssignee", "Kim")]))
            .await
            .unwrap();
        assert_eq!(result.message, "Reassigned: a - Assigned to: Kim");

        let bulk = BulkUpdateAssignee::new(store.clone());
        let result = bulk
            .execute(&params(&[("newAssignee", "Lee"), ("currentAssignee", "SAM")]))
            .await
            .unwrap();
        assert_eq!(result.message, "Reassigned 1 todo(s) to Lee");

        let none = bulk
            .execute(&params(&[("newAssignee", "Lee"), ("currentAssignee", "Nobody")]))
            .await
            .unwrap();
        assert!(!none.success);
        assert_eq!(none.message, "No matching todos found to reassign");
    }

    struct DownStore;

    #[async_trait]
    impl TaskStore for DownStore {
        async fn create(&self, _task: NewTask) -> crate::store::Result<TaskRecord> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn list(&self, _filter: &TaskFilter) -> crate::store::Result<Vec<TaskRecord>> {
            Err(StoreError::Database("no such table: tasks".into()))
        }
        async fn get_by_id(&self, _id: &str) -> crate::store::Result<Option<TaskRecord>> {
            Ok(None)
        }
        async fn find_by_title(&self, _title: &str) -> crate::store::Result<Option<TaskRecord>> {
            Ok(None)
        }
        async fn replace(&self, _record: &TaskRecord) -> crate::store::Result<()> {
            Ok(())
        }
        async fn remove(&self, _id: &str) -> crate::store::Result<bool> {
            Ok(false)
        }
        async fn ping(&self) -> crate::store::Result<()> {
            Ok(())
        }
        fn backend_name(&self) -> &'static str {
            "down"
        }
    }

    #[tokio::test]
    async fn test_unavailable_store_is_handler_error() {
        let err = CreateTodo::new(Arc::new(DownStore))
            .execute(&params(&[("title", "x")]))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Unavailable { operation: "createTodo", .. }));
    }

    #[tokio::test]
    async fn test_query_failure_is_failed_result() {
        let result = ListTodos::new(Arc::new(DownStore))
            .execute(&Parameters::new())
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.message, "Failed to list todos");
        assert!(result.error_detail.unwrap().contains("no such table"));
    }
}
