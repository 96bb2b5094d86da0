//! Long-term memory for AI agents: store short text facts with vector
//! embeddings, recall the most relevant ones for a query, and manage their
//! relevance over time through deduplication and forgetting-curve decay.
//!
//! Memories are partitioned by an owner scope (`user_id` plus optional
//! `agent_id`). On write, near-duplicates within the same scope are merged
//! instead of inserted; over time, an Ebbinghaus-style retention model scores
//! each memory for reinforcement or archival.
//!
//! # Architecture
//!
//! - **Storage**: any [`storage::VectorStore`] implementation; a SQLite-backed
//!   store with full-scan cosine ranking ships in [`storage::sqlite`]
//! - **Embeddings**: pluggable via the [`embedding::EmbeddingProvider`] trait
//! - **Dedup**: similarity search scoped to the owner, merge above a
//!   configurable threshold (default 0.95)
//! - **Retention**: `exp(-decay_rate * hours / 24)` decay with reinforcement on
//!   access, computed by a pure manager that callers schedule themselves
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`embedding`] — Text-to-vector provider contract
//! - [`error`] — Typed error kinds with operation-scoped wrapping
//! - [`id`] — Unique memory ID generation
//! - [`intelligence`] — Deduplication and forgetting-curve managers
//! - [`memory`] — The orchestrating [`Client`], its async façade, and the
//!   [`Memory`] record
//! - [`similarity`] — Cosine similarity and vector normalization primitives
//! - [`storage`] — Vector store contract and the bundled SQLite store

pub mod config;
pub mod embedding;
pub mod error;
pub mod id;
pub mod intelligence;
pub mod memory;
pub mod similarity;
pub mod storage;

pub use config::MemoirConfig;
pub use error::{Error, Result};
pub use memory::options::{AddOptions, DeleteAllOptions, GetAllOptions, SearchOptions};
pub use memory::types::Memory;
pub use memory::{AsyncClient, Client};
