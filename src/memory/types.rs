//! The memory record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single remembered fact with its embedding and retention metadata.
///
/// A memory is owned by exactly one `(user_id, agent_id)` scope for its whole
/// lifetime; deduplication merges only ever touch content, embedding, and
/// `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// Unique, time-ordered ID. Assigned at creation, immutable.
    pub id: String,
    /// Owner partition key.
    pub user_id: String,
    /// Secondary partition key, e.g. for per-agent memories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// The current text of the memory. Replaced wholesale on update or merge.
    pub content: String,
    /// Dense embedding; fixed dimensionality per collection.
    pub embedding: Vec<f32>,
    /// Optional sparse embedding (index to weight), stored opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse_embedding: Option<HashMap<usize, f32>>,
    /// Arbitrary JSON metadata, opaque to the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
    /// Refreshed whenever content or embedding change.
    pub updated_at: DateTime<Utc>,
    /// Forgetting-curve strength in `[0, 1]`; 1.0 on creation.
    pub retention_strength: f64,
    /// Set when retention is reinforced on access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// Transient relevance score, populated only on search results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}
