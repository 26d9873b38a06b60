//! Local pretrained sentence encoder: all-MiniLM-L6-v2 (384 dims) through
//! `fastembed`'s ONNX runtime.
//!
//! Model files are downloaded into the cache directory on first start and
//! reused afterwards. Inference is synchronous and CPU-bound.

use std::path::Path;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::{checked_vectors, EmbeddingError, EmbeddingProvider, Vector};

pub const MODEL_ID: &str = "all-MiniLM-L6-v2";
pub const DIMENSIONS: usize = 384;
const BATCH_SIZE: usize = 64;

pub struct FastEmbedProvider {
    model: Mutex<TextEmbedding>,
}

impl FastEmbedProvider {
    /// Loads (downloading if needed) the model into `cache_dir`. Failure is
    /// fatal for the engine.
    pub fn load(cache_dir: &Path) -> Result<Self, EmbeddingError> {
        let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_cache_dir(cache_dir.to_path_buf())
            .with_show_download_progress(false);

        let model = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::ModelLoad(format!("{MODEL_ID}: {e}")))?;
        info!("Loaded {MODEL_ID} from {}", cache_dir.display());

        Ok(Self {
            model: Mutex::new(model),
        })
    }

    fn run(&self, texts: Vec<&str>) -> Result<Vec<Vector>, EmbeddingError> {
        let count = texts.len();
        let vectors = self
            .model
            .lock()
            .embed(texts, Some(BATCH_SIZE))
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        if vectors.len() != count {
            return Err(EmbeddingError::Malformed(format!(
                "{} embeddings for {count} inputs",
                vectors.len()
            )));
        }
        debug!("embedded {count} inputs with {MODEL_ID}");
        checked_vectors(vectors, DIMENSIONS)
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn model_id(&self) -> &str {
        MODEL_ID
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    fn encode(&self, text: &str) -> Result<Vector, EmbeddingError> {
        self.run(vec![text])?
            .pop()
            .ok_or_else(|| EmbeddingError::Malformed("empty embedding batch".to_string()))
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.run(texts.iter().map(String::as_str).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{cosine_similarity, HashingEmbedder};

    fn similarity(encoder: &dyn EmbeddingProvider, a: &str, b: &str) -> f32 {
        cosine_similarity(&encoder.encode(a).unwrap(), &encoder.encode(b).unwrap())
    }

    #[test]
    fn test_hashing_fallback_cannot_see_synonyms() {
        let hashing = HashingEmbedder::new(DIMENSIONS).unwrap();
        assert_eq!(similarity(&hashing, "software engineer", "computer programmer"), 0.0);
        assert_eq!(similarity(&hashing, "nurse", "midwife"), 0.0);
    }

    #[test]
    #[ignore = "downloads the all-MiniLM-L6-v2 model"]
    fn test_minilm_relates_role_synonyms() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = FastEmbedProvider::load(dir.path()).unwrap();
        assert_eq!(encoder.dimensions(), DIMENSIONS);

        let related = similarity(&encoder, "software engineer", "computer programmer");
        let unrelated = similarity(&encoder, "software engineer", "registered nurse");
        assert!(related > 0.3, "synonym similarity was {related}");
        assert!(related > unrelated, "{related} should beat {unrelated}");

        let batch = encoder
            .encode_batch(&["nurse".to_string(), "midwife".to_string()])
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert!(cosine_similarity(&batch[0], &batch[1]) > 0.3);
    }
}
