//! Structured logging field name constants for valet.
//!
//! All crates use these constants for consistent structured logging fields so
//! log aggregation can query by standardized names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (chunks, vector ids) |

/// Subsystem originating the log event.
/// Values: "db", "indexer", "vector", "embedding", "daemon"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "notes", "tasks", "purge_pass", "index_pass", "chroma"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "purge", "add_texts", "mark_indexed"
pub const OPERATION: &str = "op";

/// Record id being operated on.
pub const RECORD_ID: &str = "record_id";

/// Entity kind being processed ("note" or "task").
pub const RECORD_KIND: &str = "kind";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of chunks produced or embedded.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Number of vector ids affected by a store mutation.
pub const VECTOR_ID_COUNT: &str = "vector_id_count";

/// Number of records selected by a pass.
pub const RECORD_COUNT: &str = "record_count";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
