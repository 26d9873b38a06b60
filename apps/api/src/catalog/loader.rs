//! Local-file loader for every catalog table.
//!
//! Each file is optional. A missing or unparseable file degrades to an empty
//! table; a malformed row is skipped. Nothing here is fatal.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::assessment::config::ScoringOverrides;
use crate::catalog::models::{
    BroaderRelation, CourseRecord, JobRecord, Mentor, Occupation, OccupationSkillRelation,
    PricingConfig, ProgressionPath, QuestionPool, SalaryRecord, Skill,
};

/// Raw rows as delivered by a loader, before any index or embedding is built.
#[derive(Debug, Clone, Default)]
pub struct CatalogTables {
    pub occupations: Vec<Occupation>,
    pub skills: Vec<Skill>,
    pub relations: Vec<OccupationSkillRelation>,
    pub broader: Vec<BroaderRelation>,
    pub jobs: Vec<JobRecord>,
    pub courses: Vec<CourseRecord>,
    pub academic: Vec<CourseRecord>,
    pub mentors: Vec<Mentor>,
    pub progressions: Vec<ProgressionPath>,
    pub salaries: Vec<SalaryRecord>,
    pub pricing: PricingConfig,
    pub scoring: ScoringOverrides,
    pub questions: QuestionPool,
}

/// Loads all tables from `data_dir`.
pub fn load_from_dir(data_dir: &Path) -> CatalogTables {
    info!("loading catalog tables from {}", data_dir.display());

    let mut jobs: Vec<JobRecord> = load_rows(data_dir, "jobs.json");
    let synthetic: Vec<JobRecord> = load_rows(data_dir, "synthetic_jobs.json");
    if !synthetic.is_empty() {
        info!("merging {} synthetic jobs", synthetic.len());
        jobs.extend(synthetic);
    }

    let tables = CatalogTables {
        occupations: load_rows(data_dir, "occupations.json"),
        skills: load_rows(data_dir, "skills.json"),
        relations: load_rows(data_dir, "occupation_skill_relations.json"),
        broader: load_rows(data_dir, "broader_occupations.json"),
        jobs,
        courses: load_rows(data_dir, "courses.json"),
        academic: load_rows(data_dir, "academic_courses.json"),
        mentors: load_rows(data_dir, "mentors.json"),
        progressions: load_rows(data_dir, "career_progressions.json"),
        salaries: load_rows(data_dir, "salaries.json"),
        pricing: load_object(data_dir, "pricing_estimates.json"),
        scoring: load_object(data_dir, "scoring_config.json"),
        questions: load_object(data_dir, "assessment_questions.json"),
    };

    info!(
        "catalog loaded: {} occupations, {} skills, {} relations, {} jobs, {} courses, {} academic, {} mentors, {} progressions",
        tables.occupations.len(),
        tables.skills.len(),
        tables.relations.len(),
        tables.jobs.len(),
        tables.courses.len(),
        tables.academic.len(),
        tables.mentors.len(),
        tables.progressions.len()
    );

    tables
}

fn read_json(data_dir: &Path, file: &str) -> Option<Value> {
    let path = data_dir.join(file);
    if !path.exists() {
        warn!("{} not found, continuing with empty data", path.display());
        return None;
    }

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("failed to read {}: {e}", path.display());
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("failed to parse {}: {e}", path.display());
            None
        }
    }
}

/// Decodes a JSON array row by row, skipping rows that fail to decode.
fn load_rows<T: DeserializeOwned>(data_dir: &Path, file: &str) -> Vec<T> {
    let rows = match read_json(data_dir, file) {
        Some(Value::Array(rows)) => rows,
        Some(_) => {
            warn!("{file} is not a JSON array, ignoring");
            return Vec::new();
        }
        None => return Vec::new(),
    };

    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(i, row)| match serde_json::from_value(row) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("{file}: skipping row {i}: {e}");
                None
            }
        })
        .collect();

    if decoded.len() < total {
        warn!("{file}: kept {} of {total} rows", decoded.len());
    }
    decoded
}

fn load_object<T: DeserializeOwned + Default>(data_dir: &Path, file: &str) -> T {
    match read_json(data_dir, file) {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("{file}: unexpected shape ({e}), using defaults");
            T::default()
        }),
        None => T::default(),
    }
}
