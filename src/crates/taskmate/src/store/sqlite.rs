//! SQLite task store
//!
//! Tasks live in a single `tasks` table created by the embedded migrations
//! in `./migrations`. Timestamps are stored as Unix milliseconds.

use super::{NewTask, Result, StoreError, TaskFilter, TaskRecord, TaskStore};
use crate::schema::Priority;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::path::Path;
use tracing::{debug, info};

const SELECT_COLUMNS: &str =
    "SELECT id, title, completed, priority, assignee, created_at, updated_at FROM tasks";

/// Task store backed by a SQLite database file.
#[derive(Clone, Debug)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Open (creating if needed) the database at `path` and run migrations.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Unavailable(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        debug!(path = %path.display(), "Connecting to task database");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect to database: {}", e)))?;

        let store = Self { pool };
        store.run_migrations().await?;

        info!(path = %path.display(), "Task database ready");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {}", e)))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn row_to_record(row: &SqliteRow) -> Result<TaskRecord> {
        let priority: String = row.try_get("priority").map_err(|e| map_sqlx("read priority", e))?;
        let priority = priority
            .parse::<Priority>()
            .map_err(|e| StoreError::Database(format!("Corrupt priority column: {}", e)))?;

        Ok(TaskRecord {
            id: row.try_get("id").map_err(|e| map_sqlx("read id", e))?,
            title: row.try_get("title").map_err(|e| map_sqlx("read title", e))?,
            completed: row
                .try_get("completed")
                .map_err(|e| map_sqlx("read completed", e))?,
            priority,
            assignee: row
                .try_get("assignee")
                .map_err(|e| map_sqlx("read assignee", e))?,
            created_at: from_millis(
                row.try_get("created_at")
                    .map_err(|e| map_sqlx("read created_at", e))?,
            )?,
            updated_at: from_millis(
                row.try_get("updated_at")
                    .map_err(|e| map_sqlx("read updated_at", e))?,
            )?,
        })
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| StoreError::Database(format!("Corrupt timestamp: {}", millis)))
}

/// Pool and I/O failures mean the store is unreachable; anything else is a
/// failed query.
fn map_sqlx(context: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("Failed to {}: {}", context, err))
        }
        other => StoreError::Database(format!("Failed to {}: {}", context, other)),
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn create(&self, task: NewTask) -> Result<TaskRecord> {
        let record = TaskRecord::new(task, Utc::now())?;

        sqlx::query(
            "INSERT INTO tasks (id, title, completed, priority, assignee, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.title)
        .bind(record.completed)
        .bind(record.priority.as_str())
        .bind(&record.assignee)
        .bind(record.created_at.timestamp_millis())
        .bind(record.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx("save task", e))?;

        Ok(record)
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<TaskRecord>> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
        query.push(" WHERE 1 = 1");

        if let Some(term) = &filter.search_term {
            query
                .push(" AND instr(lower(title), lower(")
                .push_bind(term.clone())
                .push(")) > 0");
        }
        if let Some(priority) = filter.priority {
            query.push(" AND priority = ").push_bind(priority.as_str());
        }
        if let Some(window) = filter.date_filter {
            let (start, end) = window.window(Utc::now());
            query
                .push(" AND created_at >= ")
                .push_bind(start.timestamp_millis());
            if let Some(end) = end {
                query
                    .push(" AND created_at < ")
                    .push_bind(end.timestamp_millis());
            }
        }
        if let Some(assignee) = &filter.assignee {
            query
                .push(" AND lower(assignee) = lower(")
                .push_bind(assignee.trim().to_string())
                .push(")");
        }
        query.push(" ORDER BY created_at DESC, rowid DESC");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx("list tasks", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<TaskRecord>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.to_ascii_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("load task", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<TaskRecord>> {
        let row = sqlx::query(&format!(
            "{} WHERE lower(title) = lower(?) ORDER BY created_at DESC, rowid DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(title.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx("find task by title", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn replace(&self, record: &TaskRecord) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tasks
             SET title = ?, completed = ?, priority = ?, assignee = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&record.title)
        .bind(record.completed)
        .bind(record.priority.as_str())
        .bind(&record.assignee)
        .bind(record.updated_at.timestamp_millis())
        .bind(&record.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx("update task", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Database(format!("Task not found: {}", record.id)));
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx("delete task", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Database ping failed: {}", e)))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
