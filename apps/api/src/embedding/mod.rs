//! Embedding Provider: the only way text becomes a vector in PathFinder.
//!
//! Backends implement `EmbeddingProvider`; the engine holds an
//! `Arc<dyn EmbeddingProvider>` chosen at startup from config.
//! `nearest` is backend-agnostic and works on any precomputed corpus.

pub mod cache;
pub mod hashing;
pub mod minilm;
pub mod remote;

use thiserror::Error;

pub use hashing::HashingEmbedder;
pub use minilm::FastEmbedProvider;
pub use remote::RemoteEmbedder;

/// A dense text embedding.
pub type Vector = Vec<f32>;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model failed to load: {0}")]
    ModelLoad(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("embedding inference failed: {0}")]
    Inference(String),

    #[error("malformed embedding response: {0}")]
    Malformed(String),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Text encoder capability. Must be deterministic for identical input and model.
pub trait EmbeddingProvider: Send + Sync {
    /// Stable identifier of the model; part of the embedding-cache key.
    fn model_id(&self) -> &str;

    fn dimensions(&self) -> usize;

    fn encode(&self, text: &str) -> Result<Vector, EmbeddingError>;

    /// Encodes many texts, preserving input order.
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>, EmbeddingError> {
        texts.iter().map(|t| self.encode(t)).collect()
    }
}

/// Every vector must have `dimensions` finite components.
pub(crate) fn checked_vectors(vectors: Vec<Vector>, dimensions: usize) -> Result<Vec<Vector>, EmbeddingError> {
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dimensions,
            got: bad.len(),
        });
    }
    if let Some(row) = vectors.iter().position(|v| v.iter().any(|x| !x.is_finite())) {
        return Err(EmbeddingError::Malformed(format!(
            "non-finite value in embedding {row}"
        )));
    }
    Ok(vectors)
}

/// A single nearest-neighbour hit: corpus row index and cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub score: f32,
}

/// Cosine similarity. Zero-length, zero-norm or non-finite vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Returns the top `k` corpus rows by cosine similarity, highest first.
/// Ties keep the lower index first.
pub fn nearest(query: &[f32], corpus: &[Vector], k: usize) -> Vec<Hit> {
    if k == 0 || corpus.is_empty() || query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<Hit> = corpus
        .iter()
        .enumerate()
        .map(|(index, v)| Hit {
            index,
            score: cosine_similarity(query, v),
        })
        .collect();

    // stable sort keeps index order among equal scores
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(k);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors_is_one() {
        let v = vec![0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_nearest_orders_descending() {
        let corpus = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.7, 0.7]];
        let hits = nearest(&[1.0, 0.0], &corpus, 3);
        let order: Vec<usize> = hits.iter().map(|h| h.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert!(hits[0].score >= hits[1].score && hits[1].score >= hits[2].score);
    }

    #[test]
    fn test_nearest_ties_keep_index_order() {
        let corpus = vec![vec![1.0, 0.0]; 4];
        let hits = nearest(&[1.0, 0.0], &corpus, 2);
        assert_eq!(hits[0].index, 0);
        assert_eq!(hits[1].index, 1);
    }

    #[test]
    fn test_nearest_orders_nan_scores_consistently() {
        let corpus = vec![vec![0.2, 0.9], vec![f32::NAN, 1.0], vec![1.0, 0.0], vec![0.7, 0.7]];
        let hits = nearest(&[1.0, 0.0], &corpus, 4);
        let order: Vec<usize> = hits.iter().map(|h| h.index).collect();
        assert_eq!(order, vec![2, 3, 0, 1], "the NaN row scores 0 and sorts last");
        assert_eq!(hits[3].score, 0.0);
    }

    #[test]
    fn test_non_finite_embeddings_are_rejected() {
        let vectors = vec![vec![0.1, 0.2], vec![f32::NAN, 0.3]];
        assert!(matches!(
            checked_vectors(vectors, 2),
            Err(EmbeddingError::Malformed(_))
        ));
        let vectors = vec![vec![f32::INFINITY, 0.0]];
        assert!(checked_vectors(vectors, 2).is_err());
    }

    #[test]
    fn test_checked_vectors_enforces_dimensions() {
        assert!(matches!(
            checked_vectors(vec![vec![0.1, 0.2, 0.3]], 2),
            Err(EmbeddingError::DimensionMismatch { expected: 2, got: 3 })
        ));
        let ok = checked_vectors(vec![vec![0.1, 0.2]], 2).unwrap();
        assert_eq!(ok, vec![vec![0.1, 0.2]]);
    }

    #[test]
    fn test_nearest_truncates_to_k_and_handles_empty() {
        let corpus = vec![vec![1.0], vec![0.5], vec![0.2]];
        assert_eq!(nearest(&[1.0], &corpus, 2).len(), 2);
        assert!(nearest(&[1.0], &[], 5).is_empty());
        assert!(nearest(&[], &corpus, 5).is_empty());
        assert!(nearest(&[1.0], &corpus, 0).is_empty());
    }
}
