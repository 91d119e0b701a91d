//! Chroma vector store adapter.
//!
//! One adapter instance per logical collection (`notes`, `tasks`). Chunks are
//! embedded client-side through an [`EmbeddingBackend`] and stored with
//! client-assigned UUID ids, which the indexer persists on the source record
//! for later deletion.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info};
use uuid::Uuid;

use valet_core::{EmbeddingBackend, Error, Result, VectorStore};

/// Default request timeout for vector store calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`ChromaVectorStore`].
#[derive(Debug, Clone)]
pub struct ChromaConfig {
    /// Base URL of the Chroma server.
    pub base_url: String,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl ChromaConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `CHROMA_URL` | `http://localhost:8000` | Chroma server base URL |
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("CHROMA_URL")
                .unwrap_or_else(|_| Self::default().base_url),
        }
    }
}

#[derive(Debug, Serialize)]
struct GetOrCreateCollectionRequest<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    ids: &'a [String],
    embeddings: &'a [Vec<f32>],
    documents: &'a [String],
    metadatas: Vec<&'a JsonValue>,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
}

/// Chroma-backed implementation of [`VectorStore`] for one collection.
pub struct ChromaVectorStore {
    client: reqwest::Client,
    base_url: String,
    collection_name: String,
    collection_id: String,
    embedder: Arc<dyn EmbeddingBackend>,
}

impl ChromaVectorStore {
    /// Connect to the server and resolve (or create) the named collection.
    pub async fn connect(
        config: ChromaConfig,
        collection_name: &str,
        embedder: Arc<dyn EmbeddingBackend>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let url = format!("{}/api/v1/collections", base_url);
        let response = client
            .post(&url)
            .json(&GetOrCreateCollectionRequest {
                name: collection_name,
                get_or_create: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::VectorStore(format!(
                "Failed to open collection '{}': {}",
                collection_name,
                response.status()
            )));
        }
        let collection: CollectionResponse = response.json().await?;

        info!(
            subsystem = "vector",
            component = "chroma",
            op = "connect",
            collection = collection_name,
            "Vector collection ready"
        );

        Ok(Self {
            client,
            base_url,
            collection_name: collection_name.to_string(),
            collection_id: collection.id,
            embedder,
        })
    }

    fn collection_url(&self, action: &str) -> String {
        format!(
            "{}/api/v1/collections/{}/{}",
            self.base_url, self.collection_id, action
        )
    }
}

#[async_trait]
impl VectorStore for ChromaVectorStore {
    async fn add_texts(&self, texts: &[String], metadata: &JsonValue) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let embeddings = self.embedder.embed_texts(texts).await?;
        let ids: Vec<String> = texts.iter().map(|_| Uuid::new_v4().to_string()).collect();

        let response = self
            .client
            .post(self.collection_url("add"))
            .json(&AddRequest {
                ids: &ids,
                embeddings: &embeddings,
                documents: texts,
                metadatas: texts.iter().map(|_| metadata).collect(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorStore(format!(
                "add to '{}' returned {}: {}",
                self.collection_name, status, body
            )));
        }

        debug!(
            subsystem = "vector",
            component = "chroma",
            op = "add_texts",
            collection = %self.collection_name,
            chunk_count = texts.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Stored embeddings"
        );
        Ok(ids)
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        // Chroma silently skips unknown ids, which the indexer's retry path
        // depends on.
        let response = self
            .client
            .post(self.collection_url("delete"))
            .json(&DeleteRequest { ids })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorStore(format!(
                "delete from '{}' returned {}: {}",
                self.collection_name, status, body
            )));
        }

        debug!(
            subsystem = "vector",
            component = "chroma",
            op = "delete",
            collection = %self.collection_name,
            vector_id_count = ids.len(),
            "Deleted embeddings"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_url() {
        assert_eq!(ChromaConfig::default().base_url, "http://localhost:8000");
    }

    #[test]
    fn test_add_request_serializes_one_metadata_per_text() {
        let meta = serde_json::json!({"kind": "note", "id": 1});
        let ids = vec!["a".to_string(), "b".to_string()];
        let embeddings = vec![vec![0.1_f32], vec![0.2_f32]];
        let documents = vec!["x".to_string(), "y".to_string()];

        let request = AddRequest {
            ids: &ids,
            embeddings: &embeddings,
            documents: &documents,
            metadatas: documents.iter().map(|_| &meta).collect(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["metadatas"].as_array().unwrap().len(), 2);
        assert_eq!(json["metadatas"][0]["kind"], "note");
        assert_eq!(json["metadatas"][1], json["metadatas"][0]);
    }
}
