//! Taxonomy Index: occupations, skills, typed occupation→skill relations and
//! occupation→broader-occupation edges. Built once, read-only afterwards.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::catalog::models::{
    BroaderRelation, Occupation, OccupationSkillRelation, RelationType, Skill,
};
use crate::catalog::Corpus;
use crate::embedding::{nearest, EmbeddingError, EmbeddingProvider};

/// Longest chain walked by `broader_chain`; guards against cyclic edges.
const MAX_CHAIN_DEPTH: usize = 16;

/// Top-1 occupation for a free-text role.
#[derive(Debug, Clone, Serialize)]
pub struct OccupationMatch {
    pub index: usize,
    pub uri: String,
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Default, Clone)]
struct SkillTiers {
    essential: Vec<String>,
    optional: Vec<String>,
}

pub struct TaxonomyIndex {
    occupations: Corpus<Occupation>,
    by_uri: HashMap<String, usize>,
    tiers: HashMap<String, SkillTiers>,
    broader: HashMap<String, String>,
}

impl TaxonomyIndex {
    pub fn new(
        occupations: Corpus<Occupation>,
        skills: &[Skill],
        relations: &[OccupationSkillRelation],
        broader: &[BroaderRelation],
    ) -> Self {
        let by_uri = occupations
            .rows()
            .iter()
            .enumerate()
            .map(|(i, o)| (o.concept_uri.clone(), i))
            .collect();

        let labels: HashMap<&str, &str> = skills
            .iter()
            .map(|s| (s.concept_uri.as_str(), s.preferred_label.as_str()))
            .collect();

        let mut tiers: HashMap<String, SkillTiers> = HashMap::new();
        for rel in relations {
            let Some(label) = labels.get(rel.skill_uri.as_str()) else {
                continue;
            };
            let entry = tiers.entry(rel.occupation_uri.clone()).or_default();
            let bucket = match rel.relation_type {
                RelationType::Essential => &mut entry.essential,
                RelationType::Optional => &mut entry.optional,
            };
            if !bucket.iter().any(|l| l == label) {
                bucket.push((*label).to_string());
            }
        }

        // first edge wins when an occupation lists several parents
        let mut edges: HashMap<String, String> = HashMap::new();
        for edge in broader {
            if edge.concept_uri.is_empty() || edge.broader_uri.is_empty() {
                continue;
            }
            edges
                .entry(edge.concept_uri.clone())
                .or_insert_with(|| edge.broader_uri.clone());
        }

        Self {
            occupations,
            by_uri,
            tiers,
            broader: edges,
        }
    }

    pub fn occupation_count(&self) -> usize {
        self.occupations.len()
    }

    pub fn occupation(&self, index: usize) -> Option<&Occupation> {
        self.occupations.get(index)
    }

    pub fn occupation_by_uri(&self, uri: &str) -> Option<&Occupation> {
        self.by_uri.get(uri).and_then(|&i| self.occupations.get(i))
    }

    /// Nearest occupation to `role`. The top hit is accepted unconditionally,
    /// however low its similarity. `None` only when the taxonomy is empty.
    pub fn find_occupation(
        &self,
        role: &str,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Option<OccupationMatch>, EmbeddingError> {
        if self.occupations.is_empty() {
            return Ok(None);
        }
        let query = embedder.encode(role)?;
        Ok(self.occupation_match(&query))
    }

    /// Same as `find_occupation` for an already-encoded query.
    pub fn occupation_match(&self, query: &[f32]) -> Option<OccupationMatch> {
        let hit = nearest(query, self.occupations.embeddings(), 1)
            .into_iter()
            .next()?;
        let occ = self.occupations.get(hit.index)?;
        Some(OccupationMatch {
            index: hit.index,
            uri: occ.concept_uri.clone(),
            label: occ.preferred_label.clone(),
            score: hit.score,
        })
    }

    pub fn essential_skills(&self, occupation_uri: &str) -> Vec<String> {
        self.tiers
            .get(occupation_uri)
            .map(|t| t.essential.clone())
            .unwrap_or_default()
    }

    /// Optional-tier skills. Empty unless the relation table carries
    /// `optional` rows, which the shipped taxonomy export does not.
    pub fn optional_skills(&self, occupation_uri: &str) -> Vec<String> {
        self.tiers
            .get(occupation_uri)
            .map(|t| t.optional.clone())
            .unwrap_or_default()
    }

    /// Ancestors of an occupation, nearest parent first.
    pub fn broader_chain(&self, occupation_uri: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([occupation_uri]);
        let mut current = occupation_uri;

        while let Some(parent) = self.broader.get(current) {
            if chain.len() >= MAX_CHAIN_DEPTH || !seen.insert(parent.as_str()) {
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }

    /// Labels among the `k` nearest neighbours of an occupation, with the
    /// occupation itself removed, so at most `k - 1` siblings.
    pub fn alternates(&self, occupation_index: usize, k: usize) -> Vec<String> {
        let Some(query) = self.occupations.embedding(occupation_index) else {
            return Vec::new();
        };
        nearest(query, self.occupations.embeddings(), k)
            .into_iter()
            .filter(|hit| hit.index != occupation_index)
            .filter_map(|hit| self.occupations.get(hit.index))
            .map(|o| o.preferred_label.clone())
            .take(k.saturating_sub(1))
            .collect()
    }
}
