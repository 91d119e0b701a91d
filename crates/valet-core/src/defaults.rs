//! Centralized default constants for the valet system.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// CHUNKING
// =============================================================================

/// Maximum bytes per chunk for text splitting (cut at UTF-8 boundaries).
pub const CHUNK_SIZE: usize = 100;

/// Overlap bytes between adjacent chunks for context preservation.
pub const CHUNK_OVERLAP: usize = 10;

// =============================================================================
// INDEXER
// =============================================================================

/// Polling interval between indexing iterations, in seconds.
pub const INDEXER_POLL_INTERVAL_SECS: u64 = 10;

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default embedding model name (OpenAI-compatible endpoint).
pub const EMBED_MODEL: &str = "text-embedding-3-small";

/// Default embedding vector dimension for the default model.
pub const EMBED_DIMENSION: usize = 1536;

// =============================================================================
// VECTOR STORE
// =============================================================================

/// Collection name for note embeddings.
pub const NOTES_COLLECTION: &str = "notes";

/// Collection name for task embeddings.
pub const TASKS_COLLECTION: &str = "tasks";

// =============================================================================
// KANBAN
// =============================================================================

/// Initial position slot for a task appended to a board. The ordering scheme
/// itself is maintained by the kanban service, not by this crate.
pub const TASK_POSITION_STEP: f64 = 1000.0;
