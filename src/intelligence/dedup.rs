//! Similarity-based deduplication on the write path.
//!
//! Before a new memory is inserted, the manager probes the store for
//! near-duplicates within the same owner scope. A hit above the threshold is
//! merged into the existing record instead of creating a new one.

use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::memory::types::Memory;
use crate::similarity::average_and_normalize;
use crate::storage::{SearchOptions, VectorStore};

/// Default similarity threshold used when the caller passes the 0.0 sentinel.
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.95;

/// How many nearest candidates the duplicate probe inspects.
const CANDIDATE_LIMIT: usize = 5;

/// Detects and merges near-duplicate memories.
pub struct DedupManager {
    store: Arc<dyn VectorStore>,
    threshold: f64,
}

impl DedupManager {
    /// Create a manager with the given similarity threshold. A 0.0 threshold
    /// is the "use the default" sentinel.
    pub fn new(store: Arc<dyn VectorStore>, threshold: f64) -> Self {
        let threshold = if threshold == 0.0 {
            DEFAULT_DUPLICATE_THRESHOLD
        } else {
            threshold
        };
        Self { store, threshold }
    }

    /// Probe the store for a duplicate of `embedding` within the
    /// `(user_id, agent_id)` scope.
    ///
    /// Searches the top [`CANDIDATE_LIMIT`] nearest memories; the store
    /// returns them in descending score order, so the first candidate at or
    /// above the threshold is the best match. Returns `None` when the scope
    /// is empty or nothing clears the bar; store failures propagate unchanged.
    pub async fn check_duplicate(
        &self,
        embedding: &[f32],
        user_id: &str,
        agent_id: Option<&str>,
    ) -> Result<Option<String>> {
        let opts = SearchOptions {
            user_id: user_id.to_string(),
            agent_id: agent_id.map(Into::into),
            limit: CANDIDATE_LIMIT,
            ..Default::default()
        };

        let candidates = self.store.search(embedding, &opts).await?;
        for candidate in candidates {
            let score = candidate.score.unwrap_or(0.0);
            if score >= self.threshold {
                debug!(
                    id = %candidate.id,
                    score,
                    threshold = self.threshold,
                    "duplicate memory detected"
                );
                return Ok(Some(candidate.id));
            }
        }

        Ok(None)
    }

    /// Merge new content into an existing memory.
    ///
    /// The merged text is a plain append (`existing + " " + new`); the merged
    /// embedding is the normalized element-wise mean. The record's ID,
    /// `created_at`, and owner scope are untouched. Propagates `NotFound` if
    /// the existing record was deleted concurrently.
    pub async fn merge_memories(
        &self,
        existing_id: &str,
        new_content: &str,
        new_embedding: &[f32],
    ) -> Result<Memory> {
        let existing = self.store.get(existing_id).await?;

        let merged_content = format!("{} {}", existing.content, new_content);
        let merged_embedding = average_and_normalize(&existing.embedding, new_embedding)?;

        let updated = self
            .store
            .update(existing_id, &merged_content, &merged_embedding)
            .await?;
        debug!(id = %updated.id, "merged duplicate memory");
        Ok(updated)
    }
}
