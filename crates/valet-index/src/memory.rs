//! In-process vector store.
//!
//! Offline fallback used when no Chroma server is configured: embeddings are
//! "stored" as plain text + metadata in a map, so the indexing pipeline keeps
//! its full lifecycle (ids assigned, stale deletion, purge) without a vector
//! backend. Also convenient in tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use valet_core::{Error, Result, VectorStore};

/// One stored chunk.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub text: String,
    pub metadata: JsonValue,
}

/// Map-backed implementation of [`VectorStore`] for one collection.
#[derive(Default)]
pub struct MemoryVectorStore {
    entries: RwLock<HashMap<String, StoredChunk>>,
}

impl MemoryVectorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunks currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the store holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a stored chunk by id.
    pub fn get(&self, id: &str) -> Option<StoredChunk> {
        self.entries.read().ok()?.get(id).cloned()
    }

    /// All stored ids, unordered.
    pub fn ids(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn add_texts(&self, texts: &[String], metadata: &JsonValue) -> Result<Vec<String>> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::Internal("vector store lock poisoned".to_string()))?;

        let mut ids = Vec::with_capacity(texts.len());
        for text in texts {
            let id = Uuid::new_v4().to_string();
            entries.insert(
                id.clone(),
                StoredChunk {
                    text: text.clone(),
                    metadata: metadata.clone(),
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::Internal("vector store lock poisoned".to_string()))?;

        // Unknown ids are ignored: the indexer re-deletes ids from a failed
        // previous attempt.
        for id in ids {
            entries.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_assigns_one_id_per_text() {
        let store = MemoryVectorStore::new();
        let ids = store
            .add_texts(
                &["a".to_string(), "b".to_string()],
                &json!({"kind": "note"}),
            )
            .await
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&ids[0]).unwrap().metadata["kind"], "note");
    }

    #[tokio::test]
    async fn test_delete_ignores_unknown_ids() {
        let store = MemoryVectorStore::new();
        let ids = store
            .add_texts(&["a".to_string()], &json!({}))
            .await
            .unwrap();

        store.delete(&ids).await.unwrap();
        assert!(store.is_empty());

        // Deleting the same ids again is a no-op, not an error.
        store.delete(&ids).await.unwrap();
        store.delete(&["never-existed".to_string()]).await.unwrap();
    }
}
