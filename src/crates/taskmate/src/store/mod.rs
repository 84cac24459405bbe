//! Task persistence
//!
//! [`TaskStore`] is the collaborator behind every todo operation. Two
//! backends ship with the crate:
//!
//! - [`MemoryTaskStore`] - process-local, used by tests and `backend = "memory"`
//! - [`SqliteTaskStore`] - SQLite file under `~/.taskmate` by default
//!
//! Identifier resolution is shared: an id-shaped identifier is looked up by
//! id first and falls back to a title match; a title resolves to the most
//! recently created task with that exact title, ignoring case.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use crate::schema::{DateFilter, Identifier, Priority, RECORD_ID_LEN};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot be reached at all.
    #[error("task store unavailable: {0}")]
    Unavailable(String),

    /// A query failed.
    #[error("database error: {0}")]
    Database(String),

    /// The task violates a record invariant.
    #[error("invalid task: {0}")]
    Invalid(String),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// One persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
    pub assignee: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Build a fresh record with a new id.
    pub fn new(task: NewTask, now: DateTime<Utc>) -> Result<Self> {
        let title = task.title.trim().to_string();
        if title.is_empty() {
            return Err(StoreError::Invalid("title is required".to_string()));
        }

        let assignee = task
            .assignee
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_ASSIGNEE.to_string());

        Ok(Self {
            id: new_record_id(),
            title,
            completed: false,
            priority: task.priority,
            assignee,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn status_label(&self) -> &'static str {
        if self.completed {
            "Completed"
        } else {
            "Pending"
        }
    }
}

pub const DEFAULT_ASSIGNEE: &str = "Unassigned";

/// Generate a 24-character lowercase hex id.
pub fn new_record_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(RECORD_ID_LEN);
    id
}

/// Input for [`TaskStore::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub priority: Priority,
    pub assignee: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            priority: Priority::default(),
            assignee: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }
}

/// Field changes for [`TaskStore::update`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.priority.is_none() && self.assignee.is_none()
    }

    fn apply(self, record: &mut TaskRecord, now: DateTime<Utc>) -> Result<()> {
        if let Some(title) = self.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(StoreError::Invalid("title cannot be blank".to_string()));
            }
            record.title = title.to_string();
        }
        if let Some(priority) = self.priority {
            record.priority = priority;
        }
        if let Some(assignee) = self.assignee {
            let assignee = assignee.trim();
            record.assignee = if assignee.is_empty() {
                DEFAULT_ASSIGNEE.to_string()
            } else {
                assignee.to_string()
            };
        }
        record.updated_at = now;
        Ok(())
    }
}

/// Filter for listing and bulk updates. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of the title.
    pub search_term: Option<String>,
    pub priority: Option<Priority>,
    pub date_filter: Option<DateFilter>,
    /// Case-insensitive exact assignee.
    pub assignee: Option<String>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.search_term.is_none()
            && self.priority.is_none()
            && self.date_filter.is_none()
            && self.assignee.is_none()
    }

    pub fn matches(&self, record: &TaskRecord, now: DateTime<Utc>) -> bool {
        if let Some(term) = &self.search_term {
            if !record.title.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if record.priority != priority {
                return false;
            }
        }
        if let Some(window) = self.date_filter {
            if !window.contains(now, record.created_at) {
                return false;
            }
        }
        if let Some(assignee) = &self.assignee {
            if !record.assignee.eq_ignore_ascii_case(assignee.trim()) {
                return false;
            }
        }
        true
    }
}

/// Persistence collaborator for tasks.
///
/// Backends implement the primitives; identifier resolution and the
/// read-modify-write operations are provided on top of them.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task.
    async fn create(&self, task: NewTask) -> Result<TaskRecord>;

    /// Tasks matching `filter`, newest first.
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<TaskRecord>>;

    async fn get_by_id(&self, id: &str) -> Result<Option<TaskRecord>>;

    /// Most recently created task whose title equals `title`, ignoring case.
    async fn find_by_title(&self, title: &str) -> Result<Option<TaskRecord>>;

    /// Overwrite an existing record (matched by id).
    async fn replace(&self, record: &TaskRecord) -> Result<()>;

    /// Delete by id; false when nothing was deleted.
    async fn remove(&self, id: &str) -> Result<bool>;

    /// Cheap liveness check used at startup.
    async fn ping(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;

    async fn resolve(&self, identifier: &Identifier) -> Result<Option<TaskRecord>> {
        match identifier {
            Identifier::Id(id) => match self.get_by_id(id).await? {
                Some(record) => Ok(Some(record)),
                None => self.find_by_title(id).await,
            },
            Identifier::Title(title) => self.find_by_title(title).await,
        }
    }

    async fn update(
        &self,
        identifier: &Identifier,
        changes: TaskUpdate,
    ) -> Result<Option<TaskRecord>> {
        let Some(mut record) = self.resolve(identifier).await? else {
            return Ok(None);
        };
        changes.apply(&mut record, Utc::now())?;
        self.replace(&record).await?;
        Ok(Some(record))
    }

    async fn toggle_complete(&self, identifier: &Identifier) -> Result<Option<TaskRecord>> {
        let Some(mut record) = self.resolve(identifier).await? else {
            return Ok(None);
        };
        record.completed = !record.completed;
        record.updated_at = Utc::now();
        self.replace(&record).await?;
        Ok(Some(record))
    }

    async fn delete(&self, identifier: &Identifier) -> Result<Option<TaskRecord>> {
        let Some(record) = self.resolve(identifier).await? else {
            return Ok(None);
        };
        if self.remove(&record.id).await? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    /// Reassign every task matching `filter`; returns how many changed.
    async fn bulk_update_assignee(&self, new_assignee: &str, filter: &TaskFilter) -> Result<u64> {
        let now = Utc::now();
        let mut changed = 0;

        for mut record in self.list(filter).await? {
            TaskUpdate {
                assignee: Some(new_assignee.to_string()),
                ..TaskUpdate::default()
            }
            .apply(&mut record, now)?;
            self.replace(&record).await?;
            changed += 1;
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::is_record_id;
    use chrono::TimeZone;

    #[test]
    fn test_new_record_id_shape() {
        let id = new_record_id();
        assert!(is_record_id(&id), "{} is not a record id", id);
        assert_ne!(id, new_record_id());
    }

    #[test]
    fn test_new_record_defaults() {
        let now = Utc::now();
        let record = TaskRecord::new(NewTask::new("  buy milk "), now).unwrap();

        assert_eq!(record.title, "buy milk");
        assert_eq!(record.priority, Priority::Medium);
        assert_eq!(record.assignee, DEFAULT_ASSIGNEE);
        assert!(!record.completed);
        assert_eq!(record.status_label(), "Pending");
    }

    #[test]
    fn test_blank_title_rejected() {
        assert!(matches!(
            TaskRecord::new(NewTask::new("   "), Utc::now()),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn test_filter_matches() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let record = TaskRecord::new(
            NewTask::new("Buy groceries")
                .with_priority(Priority::High)
                .with_assignee("Vansh"),
            now,
        )
        .unwrap();

        assert!(TaskFilter::default().matches(&record, now));
        let filter = TaskFilter {
            search_term: Some("GROCER".into()),
            assignee: Some("vansh".into()),
            priority: Some(Priority::High),
            date_filter: Some(DateFilter::Today),
        };
        assert!(filter.matches(&record, now));

        let wrong_priority = TaskFilter {
            priority: Some(Priority::Low),
            ..TaskFilter::default()
        };
        assert!(!wrong_priority.matches(&record, now));
    }
}
