//! Vector store contract and the bundled SQLite implementation.
//!
//! The engine only depends on [`VectorStore`]; any durable keyed store with a
//! similarity search primitive can implement it. [`sqlite::SqliteStore`] is
//! the reference implementation, using a full table scan with exact cosine
//! ranking.

pub mod sqlite;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;
use crate::memory::types::Memory;

/// Constraints for a similarity search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Owner partition. Empty string matches all users.
    pub user_id: String,
    /// Secondary partition key. `None` matches any agent.
    pub agent_id: Option<String>,
    /// Maximum number of results; 0 means unlimited.
    pub limit: usize,
    /// Minimum score a result must reach to be returned.
    pub min_score: f64,
    /// Equality matches against top-level metadata keys.
    pub filters: HashMap<String, serde_json::Value>,
}

/// Constraints for listing memories.
#[derive(Debug, Clone, Default)]
pub struct GetAllOptions {
    /// Owner partition. Empty string matches all users.
    pub user_id: String,
    /// Secondary partition key. `None` matches any agent.
    pub agent_id: Option<String>,
    /// Maximum number of results; 0 means unlimited.
    pub limit: usize,
    /// Number of records to skip, for pagination.
    pub offset: usize,
}

/// Scope selector for bulk deletion.
#[derive(Debug, Clone, Default)]
pub struct DeleteAllOptions {
    /// Owner partition. Empty string matches all users.
    pub user_id: String,
    /// Secondary partition key. `None` matches any agent.
    pub agent_id: Option<String>,
}

/// Durable keyed storage of memory records with similarity search.
///
/// Contract required by the engine:
/// - `search` returns records scored against the query embedding, in
///   descending score order, at most `limit` of them, each with
///   `score >= min_score`;
/// - `get`, `update`, and `delete` on a missing ID surface
///   [`Error::NotFound`](crate::error::Error::NotFound);
/// - `get_all` orders by `created_at` descending and honors limit/offset.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a new record. The caller assigns the ID and timestamps.
    async fn insert(&self, memory: &Memory) -> Result<()>;

    /// Fetch a record by ID.
    async fn get(&self, id: &str) -> Result<Memory>;

    /// Replace a record's content and embedding, refreshing `updated_at`.
    /// Returns the updated record.
    async fn update(&self, id: &str, content: &str, embedding: &[f32]) -> Result<Memory>;

    /// Delete a record by ID.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Rank records against `embedding` under the given constraints.
    /// Returned records carry a transient `score`.
    async fn search(&self, embedding: &[f32], opts: &SearchOptions) -> Result<Vec<Memory>>;

    /// List records in a scope, newest first.
    async fn get_all(&self, opts: &GetAllOptions) -> Result<Vec<Memory>>;

    /// Delete every record in a scope.
    async fn delete_all(&self, opts: &DeleteAllOptions) -> Result<()>;

    /// Release the underlying connection.
    async fn close(&self) -> Result<()>;
}
