//! Error types for valet.

use thiserror::Error;

/// Result type alias using valet's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for valet operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Note not found (missing or pending removal)
    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    /// Task not found (missing or pending removal)
    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store operation failed
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_note_not_found() {
        let err = Error::NoteNotFound(42);
        assert_eq!(err.to_string(), "Note not found: 42");
    }

    #[test]
    fn test_error_display_task_not_found() {
        let err = Error::TaskNotFound(7);
        assert_eq!(err.to_string(), "Task not found: 7");
    }

    #[test]
    fn test_error_display_embedding() {
        let err = Error::Embedding("backend unreachable".to_string());
        assert_eq!(err.to_string(), "Embedding error: backend unreachable");
    }

    #[test]
    fn test_error_display_vector_store() {
        let err = Error::VectorStore("collection missing".to_string());
        assert_eq!(err.to_string(), "Vector store error: collection missing");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
