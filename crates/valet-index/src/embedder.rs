//! OpenAI-compatible embeddings backend.
//!
//! Works against any endpoint implementing the `/v1/embeddings` contract
//! (OpenAI, llama.cpp server, LocalAI, ...). The backend is only reached
//! from inside a vector store adapter; the indexer itself never embeds.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use valet_core::{defaults, EmbeddingBackend, Error, Result};

/// Default request timeout for embedding calls.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Configuration for [`OpenAiEmbeddingBackend`].
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Base URL of the OpenAI-compatible API (without `/embeddings`).
    pub base_url: String,
    /// Bearer token; optional for local backends.
    pub api_key: Option<String>,
    /// Model name sent with every request.
    pub model: String,
    /// Expected vector dimension.
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: defaults::EMBED_MODEL.to_string(),
            dimension: defaults::EMBED_DIMENSION,
        }
    }
}

impl EmbeddingConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `EMBEDDINGS_BASE_URL` | `https://api.openai.com/v1` | API base URL |
    /// | `EMBEDDINGS_API_KEY` | unset | Bearer token |
    /// | `EMBEDDINGS_MODEL` | `text-embedding-3-small` | Model name |
    /// | `EMBEDDINGS_DIMENSION` | `1536` | Vector dimension |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("EMBEDDINGS_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("EMBEDDINGS_API_KEY").ok(),
            model: std::env::var("EMBEDDINGS_MODEL").unwrap_or(defaults.model),
            dimension: std::env::var("EMBEDDINGS_DIMENSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.dimension),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedding backend over an OpenAI-compatible HTTP endpoint.
pub struct OpenAiEmbeddingBackend {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl OpenAiEmbeddingBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAiEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));

        let mut request = self.client.post(&url).json(&EmbeddingsRequest {
            model: &self.config.model,
            input: texts,
        });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Embeddings endpoint returned {}: {}",
                status, body
            )));
        }

        let mut payload: EmbeddingsResponse = response.json().await?;
        if payload.data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                payload.data.len()
            )));
        }

        // The API is allowed to return entries out of order.
        payload.data.sort_by_key(|d| d.index);

        debug!(
            subsystem = "embedding",
            component = "openai",
            op = "embed_texts",
            input_count = texts.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Embedded texts"
        );

        Ok(payload.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
