//! Precomputed-embedding cache, one JSON file per corpus.
//!
//! A cached file is only reused when corpus identity, model and row count all
//! match the live table. Any mismatch re-embeds the whole corpus.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::{EmbeddingError, EmbeddingProvider, Vector};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cache JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedEmbeddings {
    corpus: String,
    model: String,
    rows: usize,
    built_at: DateTime<Utc>,
    vectors: Vec<Vector>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    dir: Option<PathBuf>,
    force_refresh: bool,
}

impl EmbeddingCache {
    pub fn new(dir: impl Into<PathBuf>, force_refresh: bool) -> Self {
        Self {
            dir: Some(dir.into()),
            force_refresh,
        }
    }

    /// A cache that never reads or writes; every corpus is embedded fresh.
    pub fn disabled() -> Self {
        Self {
            dir: None,
            force_refresh: true,
        }
    }

    fn path_for(&self, corpus: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|d| d.join(format!("{corpus}_embeddings.json")))
    }

    /// Returns one vector per text, from disk when valid, otherwise freshly encoded.
    /// The returned vector count always equals `texts.len()`.
    pub fn load_or_build(
        &self,
        corpus: &str,
        texts: &[String],
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Vec<Vector>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let path = self.path_for(corpus);

        if let Some(path) = path.as_deref().filter(|_| !self.force_refresh) {
            match read_cache(path) {
                Ok(Some(cached)) => {
                    if is_reusable(&cached, corpus, texts.len(), embedder) {
                        info!("loaded {} cached embeddings for {corpus}", cached.rows);
                        return Ok(cached.vectors);
                    }
                    warn!(
                        "embedding cache for {corpus} holds {} rows of model {} (live: {} rows, model {}), rebuilding",
                        cached.vectors.len(),
                        cached.model,
                        texts.len(),
                        embedder.model_id()
                    );
                }
                Ok(None) => {}
                Err(e) => warn!("unreadable embedding cache for {corpus}: {e}, rebuilding"),
            }
        }

        info!("encoding {} rows for {corpus}", texts.len());
        let vectors = embedder.encode_batch(texts)?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::Malformed(format!(
                "{} vectors for {} rows in {corpus}",
                vectors.len(),
                texts.len()
            )));
        }

        if let Some(path) = path {
            let record = CachedEmbeddings {
                corpus: corpus.to_string(),
                model: embedder.model_id().to_string(),
                rows: texts.len(),
                built_at: Utc::now(),
                vectors,
            };
            if let Err(e) = write_cache(&path, &record) {
                warn!("failed to persist embedding cache for {corpus}: {e}");
            }
            return Ok(record.vectors);
        }

        Ok(vectors)
    }
}

fn is_reusable(
    cached: &CachedEmbeddings,
    corpus: &str,
    rows: usize,
    embedder: &dyn EmbeddingProvider,
) -> bool {
    cached.corpus == corpus
        && cached.model == embedder.model_id()
        && cached.rows == rows
        && cached.vectors.len() == rows
        && cached
            .vectors
            .iter()
            .all(|v| v.len() == embedder.dimensions())
}

fn read_cache(path: &Path) -> Result<Option<CachedEmbeddings>, CacheError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

fn write_cache(path: &Path, record: &CachedEmbeddings) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string(record)?)?;
    Ok(())
}
