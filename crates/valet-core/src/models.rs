//! Domain models for valet: notes, kanban tasks, and their indexing state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

// =============================================================================
// INDEX STATE
// =============================================================================

/// Indexing lifecycle state of a record.
///
/// Replaces the independent `is_dirty`/`for_removal` booleans with one tagged
/// state so removal+dirty is unrepresentable. Removal always takes precedence
/// over re-indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexState {
    /// Embeddings in the vector store match the record's current content.
    Active,
    /// Content changed (or record was just created); embeddings are stale or
    /// absent and the next index pass must rebuild them.
    PendingReindex,
    /// A delete was requested; the record is hidden from reads and awaits
    /// physical purge by the removal pass.
    PendingRemoval,
}

impl IndexState {
    /// Stable string form used in the database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PendingReindex => "pending_reindex",
            Self::PendingRemoval => "pending_removal",
        }
    }
}

impl std::fmt::Display for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IndexState {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "pending_reindex" => Ok(Self::PendingReindex),
            "pending_removal" => Ok(Self::PendingRemoval),
            _ => Err(format!("Invalid index state: {}", s)),
        }
    }
}

// =============================================================================
// NOTES
// =============================================================================

/// A note record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub state: IndexState,
    /// Identifiers of the embeddings currently present in the vector store
    /// for this record's indexed content.
    pub vector_ids: Vec<String>,
}

/// Request for creating a new note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

/// Request for updating an existing note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: String,
}

// =============================================================================
// TASKS
// =============================================================================

/// Kanban board column a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KanbanBoard {
    ToDo,
    InProgress,
    InReview,
    Done,
}

impl KanbanBoard {
    /// Stable string form used in the database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "to_do",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for KanbanBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for KanbanBoard {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "to_do" => Ok(Self::ToDo),
            "in_progress" => Ok(Self::InProgress),
            "in_review" => Ok(Self::InReview),
            "done" => Ok(Self::Done),
            _ => Err(format!("Invalid kanban board: {}", s)),
        }
    }
}

/// Task priority, integer-coded in ascending urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// Integer code stored in the database column.
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Urgent => 4,
        }
    }

    /// Decode the database integer form.
    pub fn from_i64(v: i64) -> std::result::Result<Self, String> {
        match v {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            4 => Ok(Self::Urgent),
            _ => Err(format!("Invalid task priority: {}", v)),
        }
    }
}

/// A kanban task record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub board: KanbanBoard,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    /// Ordering slot within the board column, maintained by the kanban
    /// service. Stored and surfaced here, never interpreted.
    pub position: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub state: IndexState,
    pub vector_ids: Vec<String>,
}

/// Request for creating a new task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub board: KanbanBoard,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Request for updating an existing task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: String,
    pub description: String,
    pub board: KanbanBoard,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

// =============================================================================
// DOCUMENT METADATA
// =============================================================================

/// Metadata attached to every chunk stored for one content field of a record.
///
/// One mapping is applied to all chunks of a single `add_texts` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Entity kind tag: "note" or "task".
    pub kind: String,
    /// Source record id.
    pub id: i64,
    /// Which content field the chunks came from.
    pub field: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Task board column, tasks only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    /// Task priority code, tasks only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// Task due date, tasks only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl DocumentMetadata {
    /// Metadata for one content field of a note.
    pub fn for_note(note: &Note, field: &str) -> Self {
        Self {
            kind: "note".to_string(),
            id: note.id,
            field: field.to_string(),
            title: note.title.clone(),
            created_at: note.created_at,
            updated_at: note.updated_at,
            board: None,
            priority: None,
            due_date: None,
        }
    }

    /// Metadata for one content field of a task.
    pub fn for_task(task: &Task, field: &str) -> Self {
        Self {
            kind: "task".to_string(),
            id: task.id,
            field: field.to_string(),
            title: task.title.clone(),
            created_at: task.created_at,
            updated_at: task.updated_at,
            board: Some(task.board.as_str().to_string()),
            priority: Some(task.priority.as_i64()),
            due_date: task.due_date,
        }
    }

    /// Serialize to the JSON mapping handed to the vector store.
    pub fn to_value(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|_| json!({}))
    }
}
