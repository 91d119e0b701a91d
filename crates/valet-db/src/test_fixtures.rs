//! Test fixtures for database and indexer tests.
//!
//! Provides an in-memory database with the full schema applied, so tests run
//! without touching the filesystem or any external service.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use valet_db::test_fixtures::TestDatabase;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let test_db = TestDatabase::new().await;
//!     let id = test_db.db.notes.create(...).await.unwrap();
//! }
//! ```

use crate::pool::create_memory_pool;
use crate::schema::init_schema;
use crate::Database;

/// In-memory database with schema applied. Dropped state disappears with it.
pub struct TestDatabase {
    pub db: Database,
}

impl TestDatabase {
    /// Create a fresh in-memory database.
    ///
    /// Panics on failure; fixtures are test-only code.
    pub async fn new() -> Self {
        let pool = create_memory_pool()
            .await
            .expect("failed to create in-memory pool");
        init_schema(&pool).await.expect("failed to apply schema");

        Self {
            db: Database::from_pool(pool),
        }
    }
}
