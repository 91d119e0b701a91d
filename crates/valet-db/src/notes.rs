//! Note repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use valet_core::{
    CreateNoteRequest, Error, IndexState, IndexStore, Note, NoteRepository, Result,
    UpdateNoteRequest,
};

use crate::id_placeholders;

/// SQLite implementation of [`NoteRepository`].
pub struct SqliteNoteRepository {
    pool: SqlitePool,
}

impl SqliteNoteRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_note(row: &SqliteRow) -> Result<Note> {
        let state: String = row.try_get("state")?;
        let vector_ids: String = row.try_get("vector_ids")?;

        Ok(Note {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
            state: state.parse().map_err(Error::Internal)?,
            vector_ids: serde_json::from_str(&vector_ids)?,
        })
    }

    async fn list_in_state(&self, state: IndexState) -> Result<Vec<Note>> {
        let rows = sqlx::query("SELECT * FROM notes WHERE state = ? ORDER BY id")
            .bind(state.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_note).collect()
    }
}

#[async_trait]
impl NoteRepository for SqliteNoteRepository {
    async fn create(&self, req: CreateNoteRequest) -> Result<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO notes (title, content, created_at, updated_at, state, vector_ids)
            VALUES (?, ?, ?, ?, ?, '[]')
            "#,
        )
        .bind(&req.title)
        .bind(&req.content)
        .bind(now)
        .bind(now)
        .bind(IndexState::PendingReindex.as_str())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(
            subsystem = "db",
            component = "notes",
            op = "create",
            record_id = id,
            "Note created"
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Note> {
        let row = sqlx::query("SELECT * FROM notes WHERE id = ? AND state != ?")
            .bind(id)
            .bind(IndexState::PendingRemoval.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_note(&row),
            None => Err(Error::NoteNotFound(id)),
        }
    }

    async fn list(&self) -> Result<Vec<Note>> {
        let rows = sqlx::query("SELECT * FROM notes WHERE state != ? ORDER BY created_at DESC")
            .bind(IndexState::PendingRemoval.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_note).collect()
    }

    async fn update(&self, id: i64, req: UpdateNoteRequest) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE notes
            SET title = ?, content = ?, updated_at = ?, state = ?
            WHERE id = ? AND state != ?
            "#,
        )
        .bind(&req.title)
        .bind(&req.content)
        .bind(Utc::now())
        .bind(IndexState::PendingReindex.as_str())
        .bind(id)
        .bind(IndexState::PendingRemoval.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE notes SET state = ?, updated_at = ? WHERE id = ? AND state != ?",
        )
        .bind(IndexState::PendingRemoval.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(IndexState::PendingRemoval.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "notes",
            op = "soft_delete",
            record_id = id,
            "Note marked for removal"
        );
        Ok(())
    }
}

#[async_trait]
impl IndexStore<Note> for SqliteNoteRepository {
    async fn list_pending_reindex(&self) -> Result<Vec<Note>> {
        self.list_in_state(IndexState::PendingReindex).await
    }

    async fn list_pending_removal(&self) -> Result<Vec<Note>> {
        self.list_in_state(IndexState::PendingRemoval).await
    }

    async fn purge(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "DELETE FROM notes WHERE id IN ({})",
            id_placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let result = query.execute(&self.pool).await?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "purge",
            record_count = result.rows_affected(),
            "Notes purged"
        );
        Ok(result.rows_affected())
    }

    async fn mark_indexed(&self, updates: &[(i64, Vec<String>)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (id, vector_ids) in updates {
            // A delete that landed mid-pass wins; never resurrect the row.
            sqlx::query(
                "UPDATE notes SET state = ?, vector_ids = ? WHERE id = ? AND state != ?",
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
