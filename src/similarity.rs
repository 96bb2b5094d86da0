//! Cosine similarity and vector normalization primitives.
//!
//! Pure functions over `f32` slices, accumulating in `f64` for stable scores.
//! These back both the dedup gate and the bundled SQLite store's ranking.

use crate::error::{Error, Result};

/// Cosine similarity between two vectors, in `[-1, 1]`.
///
/// Returns 0.0 when the lengths differ or either vector has zero norm, so a
/// degenerate input can never clear a similarity threshold.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// L2-normalize a vector. A zero vector is returned unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| (*x as f64 / norm) as f32).collect()
}

/// Element-wise mean of two equal-length vectors, normalized.
///
/// Used to merge the embeddings of deduplicated memories. Mismatched lengths
/// are an [`Error::InvalidInput`]: silently keeping one input would corrupt
/// the merged record.
pub fn average_and_normalize(a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
    if a.len() != b.len() {
        return Err(Error::InvalidInput(format!(
            "embedding dimension mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let mean: Vec<f32> = a.iter().zip(b).map(|(x, y)| (x + y) / 2.0).collect();
    Ok(normalize(&mean))
}
