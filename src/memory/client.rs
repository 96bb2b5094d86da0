//! The memory orchestrator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MemoirConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::id::{IdGenerator, UuidV7Generator};
use crate::intelligence::{DedupManager, EbbinghausManager};
use crate::memory::options::{AddOptions, DeleteAllOptions, GetAllOptions, SearchOptions};
use crate::memory::types::Memory;
use crate::storage::{self, VectorStore};

/// Façade coordinating embedding, deduplication, storage, and concurrency
/// control for every memory operation.
///
/// Mutations (`add`, `update`, `delete`, `delete_all`) hold the write half of
/// an internal reader/writer lock for their whole duration, so at most one
/// mutation is in flight at a time and dedup-check-then-merge is atomic with
/// respect to other writers. Reads (`search`, `get`, `get_all`) share the
/// read half.
///
/// Every operation takes a [`CancellationToken`]; an already-cancelled token
/// fails the operation before the embedder or store is contacted. Pass a
/// fresh token when cancellation is not needed.
pub struct Client {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    dedup: Option<DedupManager>,
    ebbinghaus: Option<EbbinghausManager>,
    ids: Box<dyn IdGenerator>,
    lock: RwLock<()>,
    closed: AtomicBool,
}

impl Client {
    /// Build a client from validated configuration and its collaborators.
    ///
    /// Configuration problems surface as
    /// [`InvalidConfig`](Error::InvalidConfig) before either collaborator is
    /// touched. When `intelligence.enabled` is set, the dedup and retention
    /// managers are constructed from the configured knobs.
    pub fn new(
        config: &MemoirConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        Self::with_id_generator(config, embedder, store, Box::new(UuidV7Generator))
    }

    /// [`new`](Self::new) with a caller-supplied ID generator.
    pub fn with_id_generator(
        config: &MemoirConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        ids: Box<dyn IdGenerator>,
    ) -> Result<Self> {
        config.validate()?;
        if embedder.dimensions() != config.embedding.dimensions {
            return Err(Error::InvalidConfig(format!(
                "embedder produces {} dimensions but config expects {}",
                embedder.dimensions(),
                config.embedding.dimensions
            )));
        }

        let (dedup, ebbinghaus) = if config.intelligence.enabled {
            (
                Some(DedupManager::new(
                    store.clone(),
                    config.intelligence.duplicate_threshold,
                )),
                Some(EbbinghausManager::new(
                    config.intelligence.decay_rate,
                    config.intelligence.reinforcement_factor,
                )),
            )
        } else {
            (None, None)
        };

        info!(
            collection = %config.storage.collection,
            dimensions = config.embedding.dimensions,
            intelligence = config.intelligence.enabled,
            "memory client initialized"
        );

        Ok(Self {
            store,
            embedder,
            dedup,
            ebbinghaus,
            ids,
            lock: RwLock::new(()),
            closed: AtomicBool::new(false),
        })
    }

    /// The retention manager, when intelligence is enabled. Retention is pure
    /// with respect to storage: callers compute, reinforce, and persist
    /// strengths on their own schedule.
    pub fn ebbinghaus(&self) -> Option<&EbbinghausManager> {
        self.ebbinghaus.as_ref()
    }

    /// Embed `content` and store it as a new memory owned by the options'
    /// scope.
    ///
    /// With `infer` set and intelligence enabled, a near-duplicate within the
    /// scope is merged into instead: the existing record is returned with
    /// appended content and averaged embedding, and no new ID is consumed.
    pub async fn add(
        &self,
        cancel: &CancellationToken,
        content: &str,
        opts: AddOptions,
    ) -> Result<Memory> {
        let _guard = self.lock.write().await;
        self.add_locked(cancel, content, opts)
            .await
            .map_err(|e| e.with_op("Add"))
    }

    async fn add_locked(
        &self,
        cancel: &CancellationToken,
        content: &str,
        opts: AddOptions,
    ) -> Result<Memory> {
        self.check_ready(cancel)?;
        if opts.user_id.is_empty() {
            return Err(Error::InvalidInput("user_id is required".into()));
        }

        let embedding = self.embed_raced(cancel, content).await?;

        if opts.infer {
            if let Some(dedup) = &self.dedup {
                if let Some(existing_id) = dedup
                    .check_duplicate(&embedding, &opts.user_id, opts.agent_id.as_deref())
                    .await?
                {
                    return dedup.merge_memories(&existing_id, content, &embedding).await;
                }
            }
        }

        let now = Utc::now();
        let memory = Memory {
            id: self.ids.generate(),
            user_id: opts.user_id,
            agent_id: opts.agent_id,
            content: content.to_string(),
            embedding,
            sparse_embedding: None,
            metadata: opts.metadata,
            created_at: now,
            updated_at: now,
            retention_strength: 1.0,
            last_accessed_at: None,
            score: None,
        };
        self.store.insert(&memory).await?;
        debug!(id = %memory.id, user = %memory.user_id, "memory added");
        Ok(memory)
    }

    /// Embed `query` and return the most relevant memories under the given
    /// constraints, in descending score order.
    pub async fn search(
        &self,
        cancel: &CancellationToken,
        query: &str,
        opts: SearchOptions,
    ) -> Result<Vec<Memory>> {
        let _guard = self.lock.read().await;
        self.search_locked(cancel, query, opts)
            .await
            .map_err(|e| e.with_op("Search"))
    }

    async fn search_locked(
        &self,
        cancel: &CancellationToken,
        query: &str,
        opts: SearchOptions,
    ) -> Result<Vec<Memory>> {
        self.check_ready(cancel)?;
        let query_embedding = self.embed_raced(cancel, query).await?;

        let store_opts = storage::SearchOptions {
            user_id: opts.user_id,
            agent_id: opts.agent_id,
            limit: opts.limit,
            min_score: opts.min_score,
            filters: opts.filters,
        };
        self.store.search(&query_embedding, &store_opts).await
    }

    /// Fetch a memory by ID.
    pub async fn get(&self, cancel: &CancellationToken, id: &str) -> Result<Memory> {
        let _guard = self.lock.read().await;
        let run = async {
            self.check_ready(cancel)?;
            self.store.get(id).await
        };
        run.await.map_err(|e| e.with_op("Get"))
    }

    /// Re-embed `content` and replace the memory's text and embedding.
    pub async fn update(
        &self,
        cancel: &CancellationToken,
        id: &str,
        content: &str,
    ) -> Result<Memory> {
        let _guard = self.lock.write().await;
        let run = async {
            self.check_ready(cancel)?;
            let embedding = self.embed_raced(cancel, content).await?;
            self.store.update(id, content, &embedding).await
        };
        run.await.map_err(|e| e.with_op("Update"))
    }

    /// Delete a memory by ID.
    pub async fn delete(&self, cancel: &CancellationToken, id: &str) -> Result<()> {
        let _guard = self.lock.write().await;
        let run = async {
            self.check_ready(cancel)?;
            self.store.delete(id).await
        };
        run.await.map_err(|e| e.with_op("Delete"))
    }

    /// List memories in a scope, newest first.
    pub async fn get_all(
        &self,
        cancel: &CancellationToken,
        opts: GetAllOptions,
    ) -> Result<Vec<Memory>> {
        let _guard = self.lock.read().await;
        let run = async {
            self.check_ready(cancel)?;
            let store_opts = storage::GetAllOptions {
                user_id: opts.user_id,
                agent_id: opts.agent_id,
                limit: opts.limit,
                offset: opts.offset,
            };
            self.store.get_all(&store_opts).await
        };
        run.await.map_err(|e| e.with_op("GetAll"))
    }

    /// Delete every memory in a scope.
    pub async fn delete_all(
        &self,
        cancel: &CancellationToken,
        opts: DeleteAllOptions,
    ) -> Result<()> {
        let _guard = self.lock.write().await;
        let run = async {
            self.check_ready(cancel)?;
            let store_opts = storage::DeleteAllOptions {
                user_id: opts.user_id,
                agent_id: opts.agent_id,
            };
            self.store.delete_all(&store_opts).await
        };
        run.await.map_err(|e| e.with_op("DeleteAll"))
    }

    /// Release the store and embedder. Idempotent; waits for in-flight
    /// operations to drain, then fails any later operation with
    /// [`Closed`](Error::Closed). Collaborator close failures are aggregated
    /// and only the first is surfaced, to keep shutdown non-blocking.
    pub async fn close(&self) -> Result<()> {
        let _guard = self.lock.write().await;
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut first_err = None;
        if let Err(e) = self.store.close().await {
            warn!("store close failed: {e}");
            first_err.get_or_insert(e);
        }
        if let Err(e) = self.embedder.close().await {
            warn!("embedder close failed: {e}");
            first_err.get_or_insert(e);
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn check_ready(&self, cancel: &CancellationToken) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::Closed);
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Run the embedder, racing it against cancellation so a token triggered
    /// mid-call abandons the provider promptly.
    async fn embed_raced(&self, cancel: &CancellationToken, text: &str) -> Result<Vec<f32>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = self.embedder.embed(text) => result,
        }
    }
}
