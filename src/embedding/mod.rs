//! Text-to-vector embedding contract.
//!
//! The engine never talks to an embedding vendor directly; it consumes this
//! trait. Implementations typically wrap a hosted API (OpenAI, Qwen, a local
//! model server) and must produce vectors of a fixed dimensionality matching
//! the collection they feed.

use async_trait::async_trait;

use crate::error::Result;

/// Trait for embedding text into dense vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector of exactly
    /// [`dimensions`](Self::dimensions) elements.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, order-preserving: the result has the same
    /// length as the input or the call fails as a whole. Implementations may
    /// override for batched inference.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// The number of dimensions this provider produces.
    fn dimensions(&self) -> usize;

    /// Release any underlying resources (connections, sessions).
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
