//! # valet-core
//!
//! Core types, traits, and abstractions for the valet personal-assistant
//! backend.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the storage layer (`valet-db`) and the indexing pipeline
//! (`valet-index`) depend on. It performs no I/O itself.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
