//! Background document indexer.
//!
//! A single polling loop keeps the vector store converging toward the
//! relational store: each iteration purges records marked for removal, then
//! re-indexes records marked dirty, notes first, then tasks. API mutation
//! handlers only flip record states; this loop is the sole writer of
//! vector-store side effects.
//!
//! Consistency rules, per pass:
//! - purge: relational rows are deleted and committed *before* their vector
//!   ids are deleted. A crash in between leaves orphaned vector entries
//!   (recoverable garbage), never a visible row without its relational truth.
//! - index: stale vector ids for the whole batch are deleted *before* any
//!   new embeddings are added, so a record never has old and new chunks
//!   queryable at once. Records are only marked clean after every record in
//!   the batch embedded successfully; a failed batch stays dirty and is
//!   retried on the next iteration with ids re-derived from scratch. This is
//!   at-least-once indexing, and the retry may re-delete ids that are
//!   already gone — the [`VectorStore`] contract requires that to be a no-op.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use valet_core::{
    defaults, Error, IndexStore, IndexableRecord, NoteRepository, Result, TaskRepository,
    TextSplitter, VectorStore,
};

/// Configuration for the document indexer.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Interval between indexing iterations.
    pub poll_interval: Duration,
    /// Whether the background loop runs at all.
    pub enabled: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(defaults::INDEXER_POLL_INTERVAL_SECS),
            enabled: true,
        }
    }
}

impl IndexerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `INDEXER_ENABLED` | `true` | Enable/disable the background loop |
    /// | `INDEXER_POLL_INTERVAL_SECS` | `10` | Seconds between iterations |
    pub fn from_env() -> Self {
        let enabled = std::env::var("INDEXER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let poll_interval = std::env::var("INDEXER_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(defaults::INDEXER_POLL_INTERVAL_SECS));

        Self {
            poll_interval,
            enabled,
        }
    }

    /// Set the polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Enable or disable the background loop.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Handle for controlling a running indexer.
pub struct IndexerHandle {
    shutdown_tx: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl IndexerHandle {
    /// Request cooperative shutdown and wait for the loop to exit.
    ///
    /// The current pass is allowed to finish; cancellation is only observed
    /// between passes, never mid-batch.
    pub async fn stop(self) -> Result<()> {
        // The loop may have exited on its own (e.g. disabled); a closed
        // channel is fine either way.
        let _ = self.shutdown_tx.send(()).await;
        self.join
            .await
            .map_err(|e| Error::Internal(format!("Indexer task panicked: {}", e)))
    }
}

/// Background indexer driving the purge and index passes.
///
/// All collaborators are injected; the indexer owns no global state and can
/// be constructed with any combination of store and adapter implementations.
pub struct DocumentIndexer {
    notes: Arc<dyn NoteRepository>,
    tasks: Arc<dyn TaskRepository>,
    note_vectors: Arc<dyn VectorStore>,
    task_vectors: Arc<dyn VectorStore>,
    splitter: Arc<dyn TextSplitter>,
    config: IndexerConfig,
}

impl DocumentIndexer {
    /// Create a new indexer over the given collaborators.
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        tasks: Arc<dyn TaskRepository>,
        note_vectors: Arc<dyn VectorStore>,
        task_vectors: Arc<dyn VectorStore>,
        splitter: Arc<dyn TextSplitter>,
        config: IndexerConfig,
    ) -> Self {
        Self {
            notes,
            tasks,
            note_vectors,
            task_vectors,
            splitter,
            config,
        }
    }

    /// Start the background loop and return a handle for control.
    ///
    /// Spawns exactly one task; the caller holds the single instance.
    pub fn start(self) -> IndexerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        let join = tokio::spawn(async move {
            self.run(&mut shutdown_rx).await;
        });

        IndexerHandle { shutdown_tx, join }
    }

    /// Run one full iteration: purge then index, notes before tasks.
    ///
    /// The loop calls this repeatedly; tests call it directly to step the
    /// pipeline deterministically.
    pub async fn run_cycle(&self) -> Result<()> {
        purge_pass(self.notes.as_ref(), self.note_vectors.as_ref()).await?;
        index_pass(
            self.notes.as_ref(),
            self.note_vectors.as_ref(),
            self.splitter.as_ref(),
        )
        .await?;

        purge_pass(self.tasks.as_ref(), self.task_vectors.as_ref()).await?;
        index_pass(
            self.tasks.as_ref(),
            self.task_vectors.as_ref(),
            self.splitter.as_ref(),
        )
        .await?;

        Ok(())
    }

    async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        if !self.config.enabled {
            info!(
                subsystem = "indexer",
                component = "loop",
                "Indexer is disabled, not starting"
            );
            return;
        }

        info!(
            subsystem = "indexer",
            component = "loop",
            poll_interval_secs = self.config.poll_interval.as_secs(),
            "Indexer started"
        );

        loop {
            // Check for shutdown before starting a new iteration
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            if let Err(e) = self.run_cycle().await {
                // The loop is the top-level supervisor: log, keep the
                // records dirty, retry after the standard interval.
                error!(
                    subsystem = "indexer",
                    component = "loop",
                    error = %e,
                    "Indexing iteration failed"
                );
            }

            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = sleep(self.config.poll_interval) => {}
            }
        }

        info!(
            subsystem = "indexer",
            component = "loop",
            "Indexer stopped"
        );
    }
}

/// Physically remove records marked for removal, then their embeddings.
async fn purge_pass<R, S, V>(store: &S, vectors: &V) -> Result<()>
where
    R: IndexableRecord,
    S: IndexStore<R> + ?Sized,
    V: VectorStore + ?Sized,
{
    let doomed = store.list_pending_removal().await?;
    if doomed.is_empty() {
        debug!(
            subsystem = "indexer",
            component = "purge_pass",
            kind = R::KIND,
            "No records pending removal"
        );
        return Ok(());
    }

    let start = Instant::now();
    let record_ids: Vec<i64> = doomed.iter().map(|r| r.record_id()).collect();
    let vector_ids: Vec<String> = doomed
        .iter()
        .flat_map(|r| r.vector_ids().iter().cloned())
        .collect();

    // Relational delete commits first: the relational store is the source of
    // truth, and an orphaned embedding is recoverable garbage while a
    // vector-purged-but-visible row would not be.
    let removed = store.purge(&record_ids).await?;
    if !vector_ids.is_empty() {
        vectors.delete(&vector_ids).await?;
    }

    info!(
        subsystem = "indexer",
        component = "purge_pass",
        kind = R::KIND,
        record_count = removed,
        vector_id_count = vector_ids.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Purged records"
    );
    Ok(())
}

/// Re-embed all dirty records of one kind and mark them clean.
async fn index_pass<R, S, V>(store: &S, vectors: &V, splitter: &dyn TextSplitter) -> Result<()>
where
    R: IndexableRecord,
    S: IndexStore<R> + ?Sized,
    V: VectorStore + ?Sized,
{
    let dirty = store.list_pending_reindex().await?;
    if dirty.is_empty() {
        debug!(
            subsystem = "indexer",
            component = "index_pass",
            kind = R::KIND,
            "No records pending reindex"
        );
        return Ok(());
    }

    let start = Instant::now();

    // Stale embeddings go first so a record never has old and new chunks
    // queryable at the same time.
    let stale: Vec<String> = dirty
        .iter()
        .flat_map(|r| r.vector_ids().iter().cloned())
        .collect();
    if !stale.is_empty() {
        vectors.delete(&stale).await?;
    }

    // Per-record embedding runs concurrently; the batch succeeds or fails as
    // a unit, so no record is marked clean unless all of them embedded.
    let updates = future::try_join_all(
        dirty
            .iter()
            .map(|record| index_record(record, vectors, splitter)),
    )
    .await?;

    store.mark_indexed(&updates).await?;

    info!(
        subsystem = "indexer",
        component = "index_pass",
        kind = R::KIND,
        record_count = updates.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Indexed records"
    );
    Ok(())
}

/// Chunk and embed every content field of one record.
///
/// Returns the record id with its freshly assigned vector ids, concatenated
/// across fields in field order.
async fn index_record<R, V>(record: &R, vectors: &V, splitter: &dyn TextSplitter) -> Result<(i64, Vec<String>)>
where
    R: IndexableRecord,
    V: VectorStore + ?Sized,
{
    debug!(
        subsystem = "indexer",
        component = "index_pass",
        kind = R::KIND,
        record_id = record.record_id(),
        "Indexing record"
    );

    let mut new_ids = Vec::new();
    for field in record.content_fields() {
        let chunks = splitter.split(&field.text);
        if chunks.is_empty() {
            continue;
        }

        let metadata = record.chunk_metadata(field.name);
        let ids = vectors.add_texts(&chunks, &metadata).await?;
        new_ids.extend(ids);
    }

    debug!(
        subsystem = "indexer",
        component = "index_pass",
        kind = R::KIND,
        record_id = record.record_id(),
        vector_id_count = new_ids.len(),
        "Record embedded"
    );
    Ok((record.record_id(), new_ids))
}
