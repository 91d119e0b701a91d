//! valet-daemon - background document indexing daemon for valet

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use valet_core::{defaults, EmbeddingBackend, TextSplitter, VectorStore};
use valet_db::Database;
use valet_index::{
    ChromaConfig, ChromaVectorStore, DocumentIndexer, EmbeddingConfig, IndexerConfig,
    MemoryVectorStore, OpenAiEmbeddingBackend, SlidingWindowSplitter,
};

/// Build the vector store pair for the notes and tasks collections.
///
/// `VECTOR_BACKEND=chroma` connects to a Chroma server and embeds through the
/// OpenAI-compatible endpoint; anything else (the default `memory`) keeps
/// everything in-process so the daemon runs with no external services.
async fn build_vector_stores() -> anyhow::Result<(Arc<dyn VectorStore>, Arc<dyn VectorStore>)> {
    let backend = std::env::var("VECTOR_BACKEND").unwrap_or_else(|_| "memory".to_string());

    match backend.as_str() {
        "chroma" => {
            let embedder: Arc<dyn EmbeddingBackend> =
                Arc::new(OpenAiEmbeddingBackend::new(EmbeddingConfig::from_env())?);
            let config = ChromaConfig::from_env();

            let notes = ChromaVectorStore::connect(
                config.clone(),
                defaults::NOTES_COLLECTION,
                embedder.clone(),
            )
            .await?;
            let tasks =
                ChromaVectorStore::connect(config, defaults::TASKS_COLLECTION, embedder).await?;

            info!(
                subsystem = "daemon",
                backend = "chroma",
                "Vector stores ready"
            );
            Ok((Arc::new(notes), Arc::new(tasks)))
        }
        _ => {
            info!(
                subsystem = "daemon",
                backend = "memory",
                "Vector stores ready"
            );
            Ok((
                Arc::new(MemoryVectorStore::new()),
                Arc::new(MemoryVectorStore::new()),
            ))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "valet_daemon=debug,valet_index=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "valet_daemon=debug,valet_index=debug,valet_db=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "sqlite://valet.db".to_string());

    info!(
        subsystem = "daemon",
        database_path = %database_path,
        "Starting valet-daemon"
    );

    let db = Database::connect(&database_path).await?;
    let (note_vectors, task_vectors) = build_vector_stores().await?;
    let splitter: Arc<dyn TextSplitter> = Arc::new(SlidingWindowSplitter::default());

    let indexer = DocumentIndexer::new(
        db.notes.clone(),
        db.tasks.clone(),
        note_vectors,
        task_vectors,
        splitter,
        IndexerConfig::from_env(),
    );
    let handle = indexer.start();

    tokio::signal::ctrl_c().await?;
    info!(subsystem = "daemon", "Shutdown signal received");

    // Let the in-flight pass finish; any half-done work stays dirty and is
    // picked up on the next start.
    handle.stop().await?;
    db.pool.close().await;

    info!(subsystem = "daemon", "valet-daemon stopped");
    Ok(())
}
