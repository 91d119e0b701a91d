//! Embedded schema bootstrap.
//!
//! The daemon owns its database file, so the schema ships inside the binary
//! and is applied idempotently at startup instead of through external
//! migration files.

use sqlx::SqlitePool;
use tracing::info;

use valet_core::Result;

const CREATE_NOTES: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    state       TEXT NOT NULL DEFAULT 'pending_reindex',
    vector_ids  TEXT NOT NULL DEFAULT '[]'
)
"#;

const CREATE_TASKS: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    board       TEXT NOT NULL,
    priority    INTEGER NOT NULL,
    due_date    TEXT,
    position    REAL NOT NULL DEFAULT 1000.0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    state       TEXT NOT NULL DEFAULT 'pending_reindex',
    vector_ids  TEXT NOT NULL DEFAULT '[]'
)
"#;

// The background loop queries by state every iteration; both tables get a
// covering index for it.
const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_notes_state ON notes(state)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_state ON tasks(state)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_board ON tasks(board, position)",
];

/// Apply the schema. Safe to call on every startup.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_NOTES).execute(pool).await?;
    sqlx::query(CREATE_TASKS).execute(pool).await?;
    for stmt in CREATE_INDEXES {
        sqlx::query(stmt).execute(pool).await?;
    }

    info!(
        subsystem = "db",
        component = "schema",
        op = "init",
        "Database schema ready"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_memory_pool;

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let pool = create_memory_pool().await.unwrap();
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
