//! Core traits for valet abstractions.
//!
//! These traits define the seams between the relational store, the vector
//! store, the text splitter and the background indexer, enabling pluggable
//! backends and testability. Concrete implementations live in `valet-db`
//! (SQLite repositories) and `valet-index` (adapters and splitter).

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::models::{
    CreateNoteRequest, CreateTaskRequest, DocumentMetadata, Note, Task, UpdateNoteRequest,
    UpdateTaskRequest,
};

// =============================================================================
// INDEXABLE RECORDS
// =============================================================================

/// One text field of a record to be chunked and embedded.
#[derive(Debug, Clone)]
pub struct ContentField {
    /// Field name, carried into chunk metadata ("title", "content", ...).
    pub name: &'static str,
    pub text: String,
}

/// Capability shared by every record kind the indexer can process.
pub trait IndexableRecord: Clone + Send + Sync + 'static {
    /// Entity kind tag used in logs and chunk metadata.
    const KIND: &'static str;

    /// Primary id assigned by the record store.
    fn record_id(&self) -> i64;

    /// Embedding ids currently present in the vector store for this record.
    fn vector_ids(&self) -> &[String];

    /// Text fields to chunk and embed, in a stable order.
    fn content_fields(&self) -> Vec<ContentField>;

    /// Metadata mapping applied to all chunks of the given field.
    fn chunk_metadata(&self, field: &str) -> JsonValue;
}

impl IndexableRecord for Note {
    const KIND: &'static str = "note";

    fn record_id(&self) -> i64 {
        self.id
    }

    fn vector_ids(&self) -> &[String] {
        &self.vector_ids
    }

    fn content_fields(&self) -> Vec<ContentField> {
        vec![
            ContentField {
                name: "title",
                text: self.title.clone(),
            },
            ContentField {
                name: "content",
                text: self.content.clone(),
            },
        ]
    }

    fn chunk_metadata(&self, field: &str) -> JsonValue {
        DocumentMetadata::for_note(self, field).to_value()
    }
}

impl IndexableRecord for Task {
    const KIND: &'static str = "task";

    fn record_id(&self) -> i64 {
        self.id
    }

    fn vector_ids(&self) -> &[String] {
        &self.vector_ids
    }

    fn content_fields(&self) -> Vec<ContentField> {
        vec![
            ContentField {
                name: "title",
                text: self.title.clone(),
            },
            ContentField {
                name: "description",
                text: self.description.clone(),
            },
        ]
    }

    fn chunk_metadata(&self, field: &str) -> JsonValue {
        DocumentMetadata::for_task(self, field).to_value()
    }
}

// =============================================================================
// RECORD STORE TRAITS
// =============================================================================

/// Indexer-facing view of a record store for one entity kind.
///
/// The background loop is the only caller of `purge` and `mark_indexed`; API
/// mutation handlers never touch the vector store and only flip states via
/// the repository traits below.
#[async_trait]
pub trait IndexStore<R: IndexableRecord>: Send + Sync {
    /// All records awaiting (re-)indexing. Never returns records pending
    /// removal; deletion takes precedence.
    async fn list_pending_reindex(&self) -> Result<Vec<R>>;

    /// All records awaiting physical purge.
    async fn list_pending_removal(&self) -> Result<Vec<R>>;

    /// Physically delete rows by id in one bulk statement and commit.
    /// Returns the number of rows deleted.
    async fn purge(&self, ids: &[i64]) -> Result<u64>;

    /// Persist successful indexing: set each record back to `Active` and
    /// replace its vector ids. Records that went to `PendingRemoval` in the
    /// meantime are left untouched.
    async fn mark_indexed(&self, updates: &[(i64, Vec<String>)]) -> Result<()>;
}

/// Repository for note CRUD plus the indexer-facing store view.
///
/// `create`/`update` mark the row `PendingReindex` in their own transaction
/// and return before any indexing happens. `delete` is a soft delete.
/// `get`/`update`/`delete` treat a soft-deleted row exactly like an absent id.
#[async_trait]
pub trait NoteRepository: IndexStore<Note> {
    /// Insert a new note, created `PendingReindex`. Returns the new id.
    async fn create(&self, req: CreateNoteRequest) -> Result<i64>;

    /// Fetch a note by id. Fails with `Error::NoteNotFound` for missing or
    /// soft-deleted rows.
    async fn get(&self, id: i64) -> Result<Note>;

    /// List all visible notes, newest first.
    async fn list(&self) -> Result<Vec<Note>>;

    /// Replace title and content and mark the note `PendingReindex`.
    async fn update(&self, id: i64, req: UpdateNoteRequest) -> Result<()>;

    /// Soft-delete: mark `PendingRemoval` for the next purge pass.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Repository for kanban task CRUD plus the indexer-facing store view.
#[async_trait]
pub trait TaskRepository: IndexStore<Task> {
    /// Insert a new task, created `PendingReindex`. Returns the new id.
    async fn create(&self, req: CreateTaskRequest) -> Result<i64>;

    /// Fetch a task by id. Fails with `Error::TaskNotFound` for missing or
    /// soft-deleted rows.
    async fn get(&self, id: i64) -> Result<Task>;

    /// List all visible tasks, grouped by board then position.
    async fn list(&self) -> Result<Vec<Task>>;

    /// Replace task fields and mark the task `PendingReindex`.
    async fn update(&self, id: i64, req: UpdateTaskRequest) -> Result<()>;

    /// Soft-delete: mark `PendingRemoval` for the next purge pass.
    async fn delete(&self, id: i64) -> Result<()>;
}

// =============================================================================
// VECTOR STORE TRAITS
// =============================================================================

/// Per-collection embedding index.
///
/// One logical collection exists per entity kind. Calls are independent, no
/// transactionality is assumed, and implementations must support concurrent
/// invocation across collections.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embed and store the given texts, applying one metadata mapping to all
    /// of them. Returns the newly assigned identifiers, one per text, in
    /// input order.
    async fn add_texts(&self, texts: &[String], metadata: &JsonValue) -> Result<Vec<String>>;

    /// Best-effort delete by id. Ids that are absent (never stored, or
    /// already deleted by an earlier attempt) MUST be ignored: the indexer's
    /// retry path re-deletes ids from a previous attempt.
    async fn delete(&self, ids: &[String]) -> Result<()>;
}

/// Splits long text into bounded-size overlapping chunks for embedding.
///
/// Must be deterministic for identical input.
pub trait TextSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<String>;
}

// =============================================================================
// EMBEDDING BACKEND
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns one embedding vector per input text, in input order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Model name being used.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndexState;
    use chrono::Utc;

    #[test]
    fn test_note_content_fields_order() {
        let now = Utc::now();
        let note = Note {
            id: 9,
            title: "a".to_string(),
            content: "b".to_string(),
            created_at: now,
            updated_at: now,
            state: IndexState::Active,
            vector_ids: vec!["v1".to_string()],
        };

        let fields = note.content_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "title");
        assert_eq!(fields[1].name, "content");
        assert_eq!(note.record_id(), 9);
        assert_eq!(note.vector_ids(), &["v1".to_string()]);
        assert_eq!(Note::KIND, "note");
    }

    #[test]
    fn test_task_chunk_metadata_field_tag() {
        let now = Utc::now();
        let task = Task {
            id: 3,
            title: "t".to_string(),
            description: "d".to_string(),
            board: crate::models::KanbanBoard::Done,
            priority: crate::models::TaskPriority::Low,
            due_date: None,
            position: 1000.0,
            created_at: now,
            updated_at: now,
            state: IndexState::Active,
            vector_ids: vec![],
        };

        let meta = task.chunk_metadata("title");
        assert_eq!(meta["field"], "title");
        assert_eq!(meta["kind"], "task");
        assert_eq!(Task::KIND, "task");
    }
}
