//! Kanban task repository implementation.
//!
//! Board ordering (the `position` column) is maintained by the kanban
//! service; this repository stores and returns it untouched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use valet_core::{
    CreateTaskRequest, Error, IndexState, IndexStore, Result, Task, TaskPriority, TaskRepository,
    UpdateTaskRequest,
};

use crate::id_placeholders;

/// SQLite implementation of [`TaskRepository`].
pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &SqliteRow) -> Result<Task> {
        let state: String = row.try_get("state")?;
        let board: String = row.try_get("board")?;
        let priority: i64 = row.try_get("priority")?;
        let vector_ids: String = row.try_get("vector_ids")?;

        Ok(Task {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            board: board.parse().map_err(Error::Internal)?,
            priority: TaskPriority::from_i64(priority).map_err(Error::Internal)?,
            due_date: row.try_get::<Option<DateTime<Utc>>, _>("due_date")?,
            position: row.try_get("position")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
            state: state.parse().map_err(Error::Internal)?,
            vector_ids: serde_json::from_str(&vector_ids)?,
        })
    }

    async fn list_in_state(&self, state: IndexState) -> Result<Vec<Task>> {
        let rows = sqlx::query("SELECT * FROM tasks WHERE state = ? ORDER BY id")
            .bind(state.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_task).collect()
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, req: CreateTaskRequest) -> Result<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO tasks
                (title, description, board, priority, due_date, position,
                 created_at, updated_at, state, vector_ids)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, '[]')
            "#,
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.board.as_str())
        .bind(req.priority.as_i64())
        .bind(req.due_date)
        .bind(valet_core::defaults::TASK_POSITION_STEP)
        .bind(now)
        .bind(now)
        .bind(IndexState::PendingReindex.as_str())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(
            subsystem = "db",
            component = "tasks",
            op = "create",
            record_id = id,
            "Task created"
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Task> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = ? AND state != ?")
            .bind(id)
            .bind(IndexState::PendingRemoval.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_task(&row),
            None => Err(Error::TaskNotFound(id)),
        }
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let rows =
            sqlx::query("SELECT * FROM tasks WHERE state != ? ORDER BY board, position")
                .bind(IndexState::PendingRemoval.as_str())
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(Self::row_to_task).collect()
    }

    async fn update(&self, id: i64, req: UpdateTaskRequest) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, board = ?, priority = ?, due_date = ?,
                updated_at = ?, state = ?
            WHERE id = ? AND state != ?
            "#,
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.board.as_str())
        .bind(req.priority.as_i64())
        .bind(req.due_date)
        .bind(Utc::now())
        .bind(IndexState::PendingReindex.as_str())
        .bind(id)
        .bind(IndexState::PendingRemoval.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TaskNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tasks SET state = ?, updated_at = ? WHERE id = ? AND state != ?",
        )
        .bind(IndexState::PendingRemoval.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(IndexState::PendingRemoval.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TaskNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "tasks",
            op = "soft_delete",
            record_id = id,
            "Task marked for removal"
        );
        Ok(())
    }
}

#[async_trait]
impl IndexStore<Task> for SqliteTaskRepository {
    async fn list_pending_reindex(&self) -> Result<Vec<Task>> {
        self.list_in_state(IndexState::PendingReindex).await
    }

    async fn list_pending_removal(&self) -> Result<Vec<Task>> {
        self.list_in_state(IndexState::PendingRemoval).await
    }

    async fn purge(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "DELETE FROM tasks WHERE id IN ({})",
            id_placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let result = query.execute(&self.pool).await?;

        debug!(
            subsystem = "db",
            component = "tasks",
            op = "purge",
            record_count = result.rows_affected(),
            "Tasks purged"
        );
        Ok(result.rows_affected())
    }

    async fn mark_indexed(&self, updates: &[(i64, Vec<String>)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (id, vector_ids) in updates {
            sqlx::query(
                "UPDATE tasks SET state = ?, vector_ids = ? WHERE id = ? AND state != ?",
            )
            .bind(IndexState::Active.as_str())
            .bind(serde_json::to_string(vector_ids)?)
            .bind(id)
            .bind(IndexState::PendingRemoval.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
