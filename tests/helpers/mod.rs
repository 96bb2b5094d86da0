#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use memoir::config::MemoirConfig;
use memoir::embedding::EmbeddingProvider;
use memoir::error::{Error, Result};
use memoir::storage::sqlite::SqliteStore;
use memoir::Client;

/// Embedding dimensionality used across the integration tests.
pub const DIMS: usize = 8;

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Deterministic embedding provider: scripted vectors per text, with a
/// hash-spike fallback so unscripted texts still embed consistently.
pub struct StaticEmbedder {
    vectors: Mutex<HashMap<String, Vec<f32>>>,
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl StaticEmbedder {
    pub fn new() -> Self {
        Self {
            vectors: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    /// Script the vector returned for an exact text.
    pub fn with_vector(self, text: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), DIMS, "scripted vector has wrong dimensions");
        self.vectors.lock().unwrap().insert(text.to_string(), vector);
        self
    }

    /// Number of embed calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent embed call fail.
    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::EmbeddingFailed("provider unavailable".into()));
        }
        if let Some(vector) = self.vectors.lock().unwrap().get(text) {
            return Ok(vector.clone());
        }
        Ok(spike(text.bytes().map(usize::from).sum::<usize>()))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

/// Unit vector with a spike at `seed`.
pub fn spike(seed: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMS];
    v[seed % DIMS] = 1.0;
    v
}

/// A vector with exactly the given cosine similarity to `spike(0)`.
pub fn tilted(cosine: f32) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMS];
    v[0] = cosine;
    v[1] = (1.0 - cosine * cosine).sqrt();
    v
}

/// Config matching the test embedder and an in-memory collection.
pub fn test_config() -> MemoirConfig {
    let mut config = MemoirConfig::default();
    config.embedding.dimensions = DIMS;
    config
}

/// Build a client over an in-memory store and the given embedder.
pub fn test_client(embedder: Arc<StaticEmbedder>) -> Client {
    let config = test_config();
    let store = Arc::new(SqliteStore::open_in_memory("memories", DIMS).unwrap());
    Client::new(&config, embedder, store).unwrap()
}

/// Client plus a second handle on its store, for direct inspection.
pub fn test_client_with_store(embedder: Arc<StaticEmbedder>) -> (Client, Arc<SqliteStore>) {
    let config = test_config();
    let store = Arc::new(SqliteStore::open_in_memory("memories", DIMS).unwrap());
    let client = Client::new(&config, embedder, store.clone()).unwrap();
    (client, store)
}
