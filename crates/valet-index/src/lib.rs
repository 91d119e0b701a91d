//! # valet-index
//!
//! Background document indexing pipeline for valet.
//!
//! This crate provides:
//! - The [`DocumentIndexer`] polling loop that keeps vector-store state
//!   eventually consistent with the relational notes/tasks tables
//! - The sliding-window [`SlidingWindowSplitter`] text chunker
//! - Vector store adapters: [`ChromaVectorStore`] (HTTP) and
//!   [`MemoryVectorStore`] (in-process fallback)
//! - The OpenAI-compatible [`OpenAiEmbeddingBackend`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use valet_db::Database;
//! use valet_index::{DocumentIndexer, IndexerConfig, MemoryVectorStore, SlidingWindowSplitter};
//!
//! let db = Database::connect("sqlite://valet.db").await?;
//! let indexer = DocumentIndexer::new(
//!     db.notes.clone(),
//!     db.tasks.clone(),
//!     Arc::new(MemoryVectorStore::new()),
//!     Arc::new(MemoryVectorStore::new()),
//!     Arc::new(SlidingWindowSplitter::default()),
//!     IndexerConfig::from_env(),
//! );
//!
//! let handle = indexer.start();
//! // ... run the rest of the application ...
//! handle.stop().await?;
//! ```

pub mod chroma;
pub mod embedder;
pub mod indexer;
pub mod memory;
pub mod splitter;

// Re-export core types
pub use valet_core::*;

pub use chroma::{ChromaConfig, ChromaVectorStore};
pub use embedder::{EmbeddingConfig, OpenAiEmbeddingBackend};
pub use indexer::{DocumentIndexer, IndexerConfig, IndexerHandle};
pub use memory::MemoryVectorStore;
pub use splitter::{SlidingWindowSplitter, SplitterConfig};
