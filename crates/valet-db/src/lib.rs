//! # valet-db
//!
//! SQLite storage layer for valet.
//!
//! This crate provides:
//! - Connection pool management with the daemon's standard pragmas
//! - Embedded schema bootstrap
//! - Repository implementations for notes and kanban tasks, including the
//!   indexer-facing [`valet_core::IndexStore`] view of each table
//!
//! ## Example
//!
//! ```rust,ignore
//! use valet_db::Database;
//! use valet_core::{CreateNoteRequest, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite://valet.db").await?;
//!
//!     let note_id = db.notes.create(CreateNoteRequest {
//!         title: "Groceries".to_string(),
//!         content: "oat milk, coffee".to_string(),
//!     }).await?;
//!
//!     println!("Created note: {}", note_id);
//!     Ok(())
//! }
//! ```

pub mod notes;
pub mod pool;
pub mod schema;
pub mod tasks;

// Always compiled so integration tests (in tests/) and the indexer's scenario
// suite can share the in-memory fixture.
pub mod test_fixtures;

use std::sync::Arc;

use sqlx::SqlitePool;

use valet_core::Result;

pub use notes::SqliteNoteRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use schema::init_schema;
pub use tasks::SqliteTaskRepository;

// Re-export core types
pub use valet_core::*;

/// Bundled database handle: one pool, one repository per entity kind.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
    pub notes: Arc<SqliteNoteRepository>,
    pub tasks: Arc<SqliteTaskRepository>,
}

impl Database {
    /// Connect to the given database path, apply the schema, and build the
    /// repositories.
    pub async fn connect(database_path: &str) -> Result<Self> {
        let pool = create_pool(database_path).await?;
        init_schema(&pool).await?;
        Ok(Self::from_pool(pool))
    }

    /// Build repositories over an existing pool. The schema must already be
    /// applied.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            notes: Arc::new(SqliteNoteRepository::new(pool.clone())),
            tasks: Arc::new(SqliteTaskRepository::new(pool.clone())),
            pool,
        }
    }
}

/// Build a `?, ?, ...` placeholder list for bulk `IN` clauses.
pub(crate) fn id_placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_placeholders() {
        assert_eq!(id_placeholders(1), "?");
        assert_eq!(id_placeholders(3), "?, ?, ?");
    }
}
