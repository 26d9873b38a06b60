//! Test-only embedders and catalog fixtures.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::catalog::loader::CatalogTables;
use crate::catalog::models::{
    BroaderRelation, CourseRecord, JobRecord, Mentor, MentorSkills, Occupation, OccupationSkillRelation,
    PoolQuestion, ProgressionPath, RelationType, SalaryRecord, Skill,
};
use crate::catalog::taxonomy::TaxonomyIndex;
use crate::catalog::{Catalog, Corpus};
use crate::embedding::cache::EmbeddingCache;
use crate::embedding::{EmbeddingError, EmbeddingProvider, HashingEmbedder, Vector};

// ────────────────────────────────────────────────────────────────────────────
// Embedders
// ────────────────────────────────────────────────────────────────────────────

/// Hashing encoder that counts `encode` / `encode_batch` calls.
pub struct CountingEmbedder {
    inner: HashingEmbedder,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            inner: HashingEmbedder::new(dimensions).unwrap(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for CountingEmbedder {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn encode(&self, text: &str) -> Result<Vector, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.encode(text)
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        texts.iter().map(|t| self.inner.encode(t)).collect()
    }
}

/// Same unit vector for every text, so every similarity is exactly 1.
pub struct ConstantEmbedder {
    dimensions: usize,
}

impl ConstantEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl EmbeddingProvider for ConstantEmbedder {
    fn model_id(&self) -> &str {
        "constant"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn encode(&self, _text: &str) -> Result<Vector, EmbeddingError> {
        let mut v = vec![0.0; self.dimensions];
        v[0] = 1.0;
        Ok(v)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixture rows
// ────────────────────────────────────────────────────────────────────────────

fn occupation(uri: &str, label: &str) -> Occupation {
    Occupation {
        concept_uri: uri.to_string(),
        preferred_label: label.to_string(),
        description: String::new(),
    }
}

fn skill(label: &str) -> Skill {
    Skill {
        concept_uri: format!("skill/{}", label.replace(' ', "-")),
        preferred_label: label.to_string(),
    }
}

fn relation(occupation: &str, skill_label: &str, relation_type: RelationType) -> OccupationSkillRelation {
    OccupationSkillRelation {
        occupation_uri: occupation.to_string(),
        skill_uri: format!("skill/{}", skill_label.replace(' ', "-")),
        relation_type,
    }
}

fn broader(child: &str, parent: &str) -> BroaderRelation {
    BroaderRelation {
        concept_uri: child.to_string(),
        broader_uri: parent.to_string(),
    }
}

fn job(title: &str, company: &str, skills: &str) -> JobRecord {
    JobRecord {
        title: title.to_string(),
        company: Some(company.to_string()),
        location: Some("Colombo".to_string()),
        extracted_skills: Some(skills.to_string()),
        ..Default::default()
    }
}

fn course(title: &str, provider: &str, fee: f64, location: &str) -> CourseRecord {
    CourseRecord {
        course_title: title.to_string(),
        provider: Some(provider.to_string()),
        fee_numeric: Some(fee),
        location: Some(location.to_string()),
        ..Default::default()
    }
}

fn path(track: &str, current: &str, next: &str, requirements: &str) -> ProgressionPath {
    ProgressionPath {
        track_name: track.to_string(),
        current_role: current.to_string(),
        next_role: next.to_string(),
        typical_years: "1-2 years".to_string(),
        requirements: requirements.to_string(),
    }
}

fn salary(title: &str, min: f64, max: f64) -> SalaryRecord {
    SalaryRecord {
        job_title: title.to_string(),
        salary_min: Some(min),
        salary_max: Some(max),
    }
}

fn taxonomy_tables() -> CatalogTables {
    use RelationType::{Essential, Optional};

    CatalogTables {
        occupations: vec![
            occupation("occ/software-developer", "software developer"),
            occupation("occ/data-analyst", "data analyst"),
            occupation("occ/web-developer", "web developer"),
            occupation("occ/registered-nurse", "registered nurse"),
            occupation("occ/marketing-manager", "marketing manager"),
        ],
        skills: [
            "python",
            "software testing",
            "sql",
            "docker",
            "excel",
            "statistics",
            "javascript",
            "patient care",
            "seo",
        ]
        .into_iter()
        .map(skill)
        .collect(),
        relations: vec![
            relation("occ/software-developer", "python", Essential),
            relation("occ/software-developer", "software testing", Essential),
            relation("occ/software-developer", "sql", Essential),
            relation("occ/software-developer", "docker", Optional),
            relation("occ/data-analyst", "sql", Essential),
            relation("occ/data-analyst", "excel", Essential),
            relation("occ/data-analyst", "statistics", Essential),
            relation("occ/web-developer", "javascript", Essential),
            relation("occ/registered-nurse", "patient care", Essential),
            relation("occ/marketing-manager", "seo", Essential),
        ],
        broader: vec![
            broader("occ/software-developer", "occ/ict-professional"),
            broader("occ/ict-professional", "occ/professional"),
        ],
        ..Default::default()
    }
}

/// The full fixture: taxonomy plus every corpus and configuration table.
pub fn tables() -> CatalogTables {
    let mut questions = BTreeMap::new();
    questions.insert(
        "problem_solving".to_string(),
        vec![PoolQuestion {
            question: "A deadline moves up a week. What do you do first?".to_string(),
            options: vec!["Re-plan".into(), "Escalate".into(), "Work overtime".into()],
        }],
    );

    let mut mentor = Mentor {
        name: "Amal Perera".to_string(),
        title: Some("Senior Software Engineer".to_string()),
        company: Some("WSO2".to_string()),
        sector: Some("IT".to_string()),
        skills: Some(MentorSkills::List(vec!["Python".into(), "SQL".into()])),
        ..Default::default()
    };
    mentor.id = Some("m-1".to_string());

    CatalogTables {
        jobs: vec![
            job("Software Developer", "WSO2", "python, git, rest apis"),
            job("Data Analyst", "Dialog", "sql, excel, tableau"),
            job("Registered Nurse", "Asiri Hospitals", "patient care"),
            job("Digital Marketing Executive", "Daraz", "seo, content"),
        ],
        courses: vec![
            course("Python Programming Bootcamp", "NIBM", 40_000.0, "Colombo"),
            course("Advanced SQL for Data Analysis", "SLIIT", 60_000.0, "Malabe"),
            course("Software Testing Professional Certificate", "BCS", 120_000.0, "Colombo"),
            course("Patient Care Essentials", "Asiri Academy", 25_000.0, "Kandy"),
        ],
        academic: vec![
            course("BSc (Hons) in Software Engineering", "University of Moratuwa", 1_200_000.0, "Moratuwa"),
            course("HND in Computing", "ESOFT", 350_000.0, "Colombo"),
        ],
        mentors: vec![mentor],
        progressions: vec![
            path("Software Engineering", "Software Intern", "Junior Software Developer", "python, git"),
            path("Data", "Data Intern", "Junior Data Analyst", "sql, excel"),
            path("Software Engineering", "Software Developer", "Senior Software Developer", "system design"),
        ],
        salaries: vec![
            salary("Software Developer", 150_000.0, 300_000.0),
            salary("Data Analyst", 100_000.0, 200_000.0),
        ],
        questions,
        ..taxonomy_tables()
    }
}

/// Everything except the taxonomy tables.
pub fn tables_without_taxonomy() -> CatalogTables {
    CatalogTables {
        occupations: Vec::new(),
        skills: Vec::new(),
        relations: Vec::new(),
        broader: Vec::new(),
        ..tables()
    }
}

/// Taxonomy plus four same-level courses: two within a 50 000 budget, two above.
pub fn budget_tables() -> CatalogTables {
    CatalogTables {
        courses: vec![
            course("Data Structures Track A", "Provider A", 150_000.0, "Colombo"),
            course("Data Structures Track B", "Provider B", 30_000.0, "Colombo"),
            course("Data Structures Track C", "Provider C", 90_000.0, "Colombo"),
            course("Data Structures Track D", "Provider D", 45_000.0, "Colombo"),
        ],
        academic: vec![course("HND in Computing", "ESOFT", 350_000.0, "Colombo")],
        jobs: vec![job("Software Developer", "WSO2", "python, git")],
        ..taxonomy_tables()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn taxonomy(embedder: &dyn EmbeddingProvider) -> TaxonomyIndex {
    let tables = taxonomy_tables();
    let occupations = Corpus::embed(
        "occupations",
        tables.occupations,
        |o| o.preferred_label.clone(),
        &EmbeddingCache::disabled(),
        embedder,
    )
    .unwrap();
    TaxonomyIndex::new(occupations, &tables.skills, &tables.relations, &tables.broader)
}

pub fn catalog_from(tables: CatalogTables, embedder: &dyn EmbeddingProvider) -> Catalog {
    Catalog::build(tables, embedder, &EmbeddingCache::disabled()).unwrap()
}

pub fn catalog(embedder: &dyn EmbeddingProvider) -> Catalog {
    catalog_from(tables(), embedder)
}

pub fn empty_catalog(embedder: &dyn EmbeddingProvider) -> Catalog {
    catalog_from(CatalogTables::default(), embedder)
}
