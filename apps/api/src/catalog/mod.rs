//! Catalog: every table the engine reads, plus the embedded corpora.
//!
//! Built once at startup from `CatalogTables` and never mutated. Handlers and
//! engine functions borrow it; nothing holds a mutable reference after `build`.

pub mod loader;
pub mod models;
pub mod taxonomy;

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::info;

use crate::assessment::config::ScoringConfig;
use crate::embedding::cache::EmbeddingCache;
use crate::embedding::{nearest, EmbeddingError, EmbeddingProvider, Vector};
use crate::matching::salary::SalaryTable;

use self::loader::CatalogTables;
use self::models::{CourseRecord, JobRecord, Mentor, PricingConfig, ProgressionPath, QuestionPool};
use self::taxonomy::TaxonomyIndex;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to embed {corpus}: {source}")]
    Embedding {
        corpus: String,
        #[source]
        source: EmbeddingError,
    },

    #[error("{corpus}: {embeddings} embeddings for {rows} rows")]
    Misaligned {
        corpus: String,
        rows: usize,
        embeddings: usize,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Corpus
// ────────────────────────────────────────────────────────────────────────────

/// Rows plus one embedding per row, index-aligned. The constructor refuses a
/// length mismatch, so every `Corpus` in existence is searchable.
#[derive(Debug, Clone)]
pub struct Corpus<T> {
    rows: Vec<T>,
    embeddings: Vec<Vector>,
}

impl<T> Corpus<T> {
    pub fn new(corpus: &str, rows: Vec<T>, embeddings: Vec<Vector>) -> Result<Self, CatalogError> {
        if rows.len() != embeddings.len() {
            return Err(CatalogError::Misaligned {
                corpus: corpus.to_string(),
                rows: rows.len(),
                embeddings: embeddings.len(),
            });
        }
        Ok(Self { rows, embeddings })
    }

    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            embeddings: Vec::new(),
        }
    }

    /// Embeds `rows` through the cache; a stale or partial cache is rebuilt.
    pub fn embed(
        corpus: &str,
        rows: Vec<T>,
        text: impl Fn(&T) -> String,
        cache: &EmbeddingCache,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self, CatalogError> {
        let texts: Vec<String> = rows.iter().map(text).collect();
        let embeddings = cache
            .load_or_build(corpus, &texts, embedder)
            .map_err(|source| CatalogError::Embedding {
                corpus: corpus.to_string(),
                source,
            })?;
        Self::new(corpus, rows, embeddings)
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn embeddings(&self) -> &[Vector] {
        &self.embeddings
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.rows.get(index)
    }

    pub fn embedding(&self, index: usize) -> Option<&Vector> {
        self.embeddings.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Top `k` rows for an encoded query, highest similarity first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(&T, f32)> {
        nearest(query, &self.embeddings, k)
            .into_iter()
            .filter_map(|hit| self.rows.get(hit.index).map(|row| (row, hit.score)))
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

pub struct Catalog {
    pub taxonomy: TaxonomyIndex,
    pub jobs: Corpus<JobRecord>,
    pub courses: Corpus<CourseRecord>,
    pub academic: Corpus<CourseRecord>,
    pub mentors: Vec<Mentor>,
    pub progressions: Vec<ProgressionPath>,
    pub salaries: SalaryTable,
    pub pricing: PricingConfig,
    pub scoring: ScoringConfig,
    pub questions: QuestionPool,
    /// Lowercased, deduplicated skills observed across all job postings.
    pub market_skills: Vec<String>,
}

impl Catalog {
    /// Embeds every corpus and indexes the taxonomy. Only an embedding failure
    /// is fatal here; empty tables simply produce empty corpora.
    pub fn build(
        tables: CatalogTables,
        embedder: &dyn EmbeddingProvider,
        cache: &EmbeddingCache,
    ) -> Result<Self, CatalogError> {
        let market_skills = market_vocabulary(&tables.jobs);

        let occupations = Corpus::embed(
            "occupations",
            tables.occupations,
            |o| o.preferred_label.clone(),
            cache,
            embedder,
        )?;
        let taxonomy = TaxonomyIndex::new(
            occupations,
            &tables.skills,
            &tables.relations,
            &tables.broader,
        );

        let jobs = Corpus::embed("jobs", tables.jobs, |j| j.title.clone(), cache, embedder)?;
        let courses = Corpus::embed(
            "courses",
            tables.courses,
            CourseRecord::embedding_text,
            cache,
            embedder,
        )?;
        let academic = Corpus::embed(
            "academic",
            tables.academic,
            CourseRecord::embedding_text,
            cache,
            embedder,
        )?;

        info!(
            "catalog ready: {} occupations, {} jobs, {} courses, {} academic, {} market skills",
            taxonomy.occupation_count(),
            jobs.len(),
            courses.len(),
            academic.len(),
            market_skills.len()
        );

        Ok(Self {
            taxonomy,
            jobs,
            courses,
            academic,
            mentors: tables.mentors,
            progressions: tables.progressions,
            salaries: SalaryTable::new(&tables.salaries),
            pricing: tables.pricing,
            scoring: ScoringConfig::layered(tables.scoring),
            questions: tables.questions,
            market_skills,
        })
    }
}

fn market_vocabulary(jobs: &[JobRecord]) -> Vec<String> {
    jobs.iter()
        .flat_map(JobRecord::skill_list)
        .map(|s| s.to_lowercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CountingEmbedder;

    #[test]
    fn test_corpus_rejects_misaligned_embeddings() {
        let result = Corpus::new("jobs", vec![JobRecord::default()], Vec::new());
        assert!(matches!(
            result,
            Err(CatalogError::Misaligned { rows: 1, embeddings: 0, .. })
        ));
    }

    #[test]
    fn test_embed_aligns_rows_and_vectors() {
        let rows = vec![
            JobRecord {
                title: "Data Analyst".into(),
                ..Default::default()
            },
            JobRecord {
                title: "Nurse".into(),
                ..Default::default()
            },
        ];
        let corpus = Corpus::embed(
            "jobs",
            rows,
            |j| j.title.clone(),
            &EmbeddingCache::disabled(),
            &CountingEmbedder::new(32),
        )
        .unwrap();
        assert_eq!(corpus.len(), corpus.embeddings().len());
    }

    #[test]
    fn test_search_returns_rows_in_similarity_order() {
        let embedder = CountingEmbedder::new(64);
        let rows = vec![
            JobRecord {
                title: "Registered Nurse".into(),
                ..Default::default()
            },
            JobRecord {
                title: "Data Analyst".into(),
                ..Default::default()
            },
        ];
        let corpus = Corpus::embed(
            "jobs",
            rows,
            |j| j.title.clone(),
            &EmbeddingCache::disabled(),
            &embedder,
        )
        .unwrap();
        let query = embedder.encode("data analyst").unwrap();
        let hits = corpus.search(&query, 2);
        assert_eq!(hits[0].0.title, "Data Analyst");
    }

    #[test]
    fn test_build_from_empty_tables() {
        let catalog = Catalog::build(
            CatalogTables::default(),
            &CountingEmbedder::new(16),
            &EmbeddingCache::disabled(),
        )
        .unwrap();
        assert!(catalog.jobs.is_empty());
        assert!(catalog.market_skills.is_empty());
        assert_eq!(catalog.taxonomy.occupation_count(), 0);
    }

    #[test]
    fn test_market_vocabulary_is_lowercase_and_unique() {
        let jobs = vec![
            JobRecord {
                extracted_skills: Some("Python, SQL".into()),
                ..Default::default()
            },
            JobRecord {
                extracted_skills: Some("python, Excel".into()),
                ..Default::default()
            },
        ];
        assert_eq!(market_vocabulary(&jobs), vec!["excel", "python", "sql"]);
    }
}
