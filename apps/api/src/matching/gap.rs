//! Skill-Gap Resolver: target role → required skills → compulsory/optional gap.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::taxonomy::OccupationMatch;
use crate::catalog::Catalog;
use crate::embedding::EmbeddingProvider;

pub const NO_MATCHING_OCCUPATION: &str = "No matching occupation";

/// Postings consulted for local market skills.
const LOCAL_POSTING_LIMIT: usize = 10;
/// Taxonomy skills kept in the required set.
const TAXONOMY_SKILL_CAP: usize = 12;
/// Below this many cross-referenced skills, the unfiltered list is used.
const MIN_CROSS_REFERENCED: usize = 5;
/// Shortest market term allowed to match inside a longer taxonomy label.
const MIN_MARKET_TERM_LEN: usize = 3;

/// Everything the taxonomy and local postings say a role requires.
#[derive(Debug, Clone, Serialize)]
pub struct RoleRequirements {
    pub occupation: Option<OccupationMatch>,
    pub mapped_occupation: String,
    /// Taxonomy skills first, then local-market skills; case-insensitively unique.
    pub required: Vec<String>,
    /// Lowercased essential-tier labels of the mapped occupation.
    #[serde(skip)]
    pub essential: HashSet<String>,
}

impl RoleRequirements {
    pub fn is_essential(&self, skill: &str) -> bool {
        self.essential.contains(&skill.to_lowercase())
    }

    /// Required skills in the essential tier, or every required skill when
    /// the occupation declares none.
    pub fn core_skills(&self) -> Vec<String> {
        let core: Vec<String> = self
            .required
            .iter()
            .filter(|s| self.is_essential(s))
            .cloned()
            .collect();
        if core.is_empty() {
            self.required.clone()
        } else {
            core
        }
    }
}

/// Requirements split against what the user already has. The two gap lists
/// never share an element.
#[derive(Debug, Clone, Serialize)]
pub struct SkillGap {
    pub requirements: RoleRequirements,
    pub compulsory: Vec<String>,
    pub optional: Vec<String>,
}

impl SkillGap {
    pub fn is_empty(&self) -> bool {
        self.compulsory.is_empty() && self.optional.is_empty()
    }

    /// Compulsory gaps first, then optional.
    pub fn ordered(&self) -> Vec<String> {
        self.compulsory
            .iter()
            .chain(self.optional.iter())
            .cloned()
            .collect()
    }
}

pub fn resolve_requirements(
    role: &str,
    catalog: &Catalog,
    embedder: &dyn EmbeddingProvider,
) -> RoleRequirements {
    let local = local_market_skills(role, catalog);

    let occupation = match catalog.taxonomy.find_occupation(role, embedder) {
        Ok(hit) => hit,
        Err(e) => {
            warn!("occupation lookup for '{role}' failed, using local skills only: {e}");
            None
        }
    };

    let (taxonomy_skills, optional_tier, essential) = match &occupation {
        Some(hit) => {
            let essential_all = catalog.taxonomy.essential_skills(&hit.uri);
            let essential: HashSet<String> =
                essential_all.iter().map(|s| s.to_lowercase()).collect();
            (
                cross_reference(essential_all, &catalog.market_skills),
                catalog.taxonomy.optional_skills(&hit.uri),
                essential,
            )
        }
        None => (Vec::new(), Vec::new(), HashSet::new()),
    };

    let mut seen = HashSet::new();
    let required: Vec<String> = taxonomy_skills
        .into_iter()
        .take(TAXONOMY_SKILL_CAP)
        .chain(local)
        .chain(optional_tier)
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect();

    let mapped_occupation = occupation
        .as_ref()
        .map(|o| o.label.clone())
        .unwrap_or_else(|| NO_MATCHING_OCCUPATION.to_string());

    debug!(
        "'{role}' → '{mapped_occupation}': {} required skills",
        required.len()
    );

    RoleRequirements {
        occupation,
        mapped_occupation,
        required,
        essential,
    }
}

pub fn resolve_gap<S: AsRef<str>>(
    role: &str,
    user_skills: &[S],
    catalog: &Catalog,
    embedder: &dyn EmbeddingProvider,
) -> SkillGap {
    split_gap(resolve_requirements(role, catalog, embedder), user_skills)
}

pub fn split_gap<S: AsRef<str>>(requirements: RoleRequirements, user_skills: &[S]) -> SkillGap {
    let have: HashSet<String> = user_skills
        .iter()
        .map(|s| s.as_ref().to_lowercase())
        .collect();

    let (compulsory, optional): (Vec<String>, Vec<String>) = requirements
        .required
        .iter()
        .filter(|s| !have.contains(&s.to_lowercase()))
        .cloned()
        .partition(|s| requirements.is_essential(s));

    SkillGap {
        requirements,
        compulsory,
        optional,
    }
}

/// Skills from up to ten postings whose title contains `role`, first-seen order.
fn local_market_skills(role: &str, catalog: &Catalog) -> Vec<String> {
    let needle = role.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    catalog
        .jobs
        .rows()
        .iter()
        .filter(|job| job.title.to_lowercase().contains(&needle))
        .take(LOCAL_POSTING_LIMIT)
        .flat_map(|job| job.skill_list())
        .filter(|s| s.chars().count() > 2)
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

/// Keeps taxonomy skills seen in the market vocabulary, unless that leaves
/// too few, in which case all of them are kept.
fn cross_reference(skills: Vec<String>, market: &[String]) -> Vec<String> {
    if market.is_empty() {
        return skills;
    }

    let filtered: Vec<String> = skills
        .iter()
        .filter(|s| {
            let lowered = s.to_lowercase();
            market.iter().any(|m| {
                *m == lowered || (m.chars().count() >= MIN_MARKET_TERM_LEN && lowered.contains(m.as_str()))
            })
        })
        .cloned()
        .collect();

    if filtered.len() < MIN_CROSS_REFERENCED {
        skills
    } else {
        filtered
    }
}
