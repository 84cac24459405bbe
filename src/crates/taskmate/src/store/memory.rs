//! In-memory task store

use super::{NewTask, Result, StoreError, TaskFilter, TaskRecord, TaskStore};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

/// Task store backed by a `Vec` in insertion order.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<TaskRecord>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, task: NewTask) -> Result<TaskRecord> {
        let record = TaskRecord::new(task, Utc::now())?;
        self.tasks.write().push(record.clone());
        Ok(record)
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<TaskRecord>> {
        let now = Utc::now();
        Ok(self
            .tasks
            .read()
            .iter()
            .rev()
            .filter(|record| filter.matches(record, now))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<TaskRecord>> {
        Ok(self
            .tasks
            .read()
            .iter()
            .find(|record| record.id.eq_ignore_ascii_case(id))
            .cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<TaskRecord>> {
        let wanted = title.trim().to_lowercase();
        Ok(self
            .tasks
            .read()
            .iter()
            .rev()
            .find(|record| record.title.to_lowercase() == wanted)
            .cloned())
    }

    async fn replace(&self, record: &TaskRecord) -> Result<()> {
        let mut tasks = self.tasks.write();
        let slot = tasks
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or_else(|| StoreError::Database(format!("Task not found: {}", record.id)))?;
        *slot = record.clone();
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let mut tasks = self.tasks.write();
        let before = tasks.len();
        tasks.retain(|record| record.id != id);
        Ok(tasks.len() < before)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Identifier, Priority};
    use crate::store::TaskUpdate;

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let store = MemoryTaskStore::new();
        store.create(NewTask::new("first")).await.unwrap();
        store.create(NewTask::new("second")).await.unwrap();

        let all = store.list(&TaskFilter::default()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_title_resolves_to_most_recent() {
        let store = MemoryTaskStore::new();
        let older = store.create(NewTask::new("Buy milk")).await.unwrap();
        let newer = store.create(NewTask::new("buy milk")).await.unwrap();

        let found = store
            .resolve(&Identifier::Title("BUY MILK".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, newer.id);
        assert_ne!(found.id, older.id);
    }

    #[tokio::test]
    async fn test_id_falls_back_to_title() {
        let store = MemoryTaskStore::new();
        let hex_title = "abcdefabcdefabcdefabcdef";
        let created = store.create(NewTask::new(hex_title)).await.unwrap();

        let found = store
            .resolve(&Identifier::parse(hex_title))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_flag() {
        let store = MemoryTaskStore::new();
        let created = store.create(NewTask::new("walk dog")).await.unwrap();
        let id = Identifier::Id(created.id.clone());

        let once = store.toggle_complete(&id).await.unwrap().unwrap();
        assert!(once.completed);
        let twice = store.toggle_complete(&id).await.unwrap().unwrap();
        assert_eq!(twice.completed, created.completed);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryTaskStore::new();
        store.create(NewTask::new("groceries")).await.unwrap();
        let title = Identifier::Title("groceries".into());

        let updated = store
            .update(
                &title,
                TaskUpdate {
                    priority: Some(Priority::High),
                    ..TaskUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.priority, Priority::High);

        let deleted = store.delete(&title).await.unwrap();
        assert!(deleted.is_some());
        assert!(store.is_empty());
        assert!(store.delete(&title).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bulk_update_assignee() {
        let store = MemoryTaskStore::new();
        store
            .create(NewTask::new("a").with_assignee("alice"))
            .await
            .unwrap();
        store
            .create(NewTask::new("b").with_assignee("Alice"))
            .await
            .unwrap();
        store.create(NewTask::new("c").with_assignee("bob")).await.unwrap();

        let filter = TaskFilter {
            assignee: Some("alice".into()),
            ..TaskFilter::default()
        };
        let changed = store.bulk_update_assignee("carol", &filter).await.unwrap();
        assert_eq!(changed, 2);

        let carol = TaskFilter {
            assignee: Some("carol".into()),
            ..TaskFilter::default()
        };
        assert_eq!(store.list(&carol).await.unwrap().len(), 2);
    }
}
