//! Recommendation Orchestrator.
//!
//! `Engine` owns the read-only catalog, the embedding provider and the
//! per-field trend cache. Every operation is synchronous and never fails for
//! lack of data: missing results become placeholders or empty lists, and
//! embedding errors past startup are logged and degraded around.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::assessment::questions::generate_questions;
use crate::assessment::{vectorize_assessment, Answers, AssessmentVector, Segment, UserLevel};
use crate::catalog::models::JobRecord;
use crate::catalog::Catalog;
use crate::embedding::{EmbeddingProvider, Vector};
use crate::matching::action_plan::action_plan;
use crate::matching::bundle::{CompleteBundle, FullBundle, JobIdea, RecommendationBundle};
use crate::matching::course_scoring::{rank, score_course, CourseRecommendation, ScoringContext};
use crate::matching::gap::{resolve_gap, resolve_requirements, SkillGap};
use crate::matching::mentors::{self, MentorMatch};
use crate::matching::progression::{self, ProgressionEntry};
use crate::matching::round_to;
use crate::matching::rules::{self, ReadinessBreakdown, TransferabilityReport, MAX_BAND};
use crate::matching::trends::{detect_field, MarketTrends, TrendAnalyzer, TrendCache, HOT_SKILL_COUNT};

const GAP_DISPLAY_LIMIT: usize = 8;
const QUERY_COMPULSORY_TERMS: usize = 4;
const QUERY_OPTIONAL_TERMS: usize = 2;
/// Longer gap entries are sentences, not skill names.
const MAX_QUERY_TERM_CHARS: usize = 40;
const LONG_TERM_WORDS: usize = 3;
const STUDENT_QUERY_BOOST: &str = "degree bachelor bsc university";
const COURSE_POOL_FACTOR: usize = 20;
const ACADEMIC_POOL_FACTOR: usize = 10;
const JOB_SEARCH_LIMIT: usize = 5;
const MENTOR_LIMIT: usize = 3;
const ALTERNATE_NEIGHBOURS: usize = 4;
const DEFAULT_TOP_N: usize = 5;
pub const UNKNOWN_PROFILE: &str = "Unknown";

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Inputs of a recommendation call.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub user_skills: Vec<String>,
    pub target_role: String,
    #[serde(default)]
    pub user_level: UserLevel,
    #[serde(default)]
    pub segment: Segment,
    #[serde(default)]
    pub education_preference: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_budget: Option<f64>,
    #[serde(default)]
    pub max_duration: Option<f64>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub assessment: Option<AssessmentVector>,
}

impl RecommendRequest {
    pub fn new(target_role: impl Into<String>, user_skills: Vec<String>) -> Self {
        Self {
            user_skills,
            target_role: target_role.into(),
            user_level: UserLevel::default(),
            segment: Segment::default(),
            education_preference: None,
            location: None,
            max_budget: None,
            max_duration: None,
            top_n: DEFAULT_TOP_N,
            assessment: None,
        }
    }

    /// Everything an assessment vector implies about the user.
    pub fn from_assessment(vector: AssessmentVector, target_role: impl Into<String>) -> Self {
        Self {
            user_skills: vector.extracted_intent_skills.clone(),
            target_role: target_role.into(),
            user_level: vector.user_level(),
            segment: vector.segment(),
            education_preference: Some(vector.education_preference_or_default()),
            location: None,
            max_budget: vector.budget_ceiling(),
            max_duration: None,
            top_n: DEFAULT_TOP_N,
            assessment: Some(vector),
        }
    }
}

pub struct Engine {
    catalog: Catalog,
    embedder: Arc<dyn EmbeddingProvider>,
    trends: Box<dyn TrendAnalyzer>,
    trend_cache: TrendCache,
}

impl Engine {
    pub fn new(catalog: Catalog, embedder: Arc<dyn EmbeddingProvider>, trends: Box<dyn TrendAnalyzer>) -> Self {
        info!(
            "engine ready (embedding model: {}, {} dims)",
            embedder.model_id(),
            embedder.dimensions()
        );
        Self {
            catalog,
            embedder,
            trends,
            trend_cache: TrendCache::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn model_id(&self) -> &str {
        self.embedder.model_id()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Assessment
    // ────────────────────────────────────────────────────────────────────────

    pub fn vectorize_assessment(&self, answers: &Answers) -> AssessmentVector {
        vectorize_assessment(
            answers,
            &self.catalog.scoring,
            &self.catalog.market_skills,
            self.embedder.as_ref(),
        )
    }

    pub fn recommend_from_assessment(&self, vector: AssessmentVector, target_role: &str) -> RecommendationBundle {
        self.recommend(&RecommendRequest::from_assessment(vector, target_role))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Recommendation
    // ────────────────────────────────────────────────────────────────────────

    pub fn recommend(&self, request: &RecommendRequest) -> RecommendationBundle {
        let role = request.target_role.trim();
        let skills = &request.user_skills;
        let vector = request.assessment.as_ref();

        let gap = resolve_gap(role, skills, &self.catalog, self.embedder.as_ref());

        if gap.is_empty() {
            let years = vector.map(|v| v.experience_years).unwrap_or(0.0);
            debug!("no gap for '{role}', returning Complete");
            return RecommendationBundle::Complete(CompleteBundle {
                mapped_occupation: gap.requirements.mapped_occupation.clone(),
                responsibility_band: rules::estimate_band(skills, years),
                skill_score: rules::skill_score(skills, &[], &gap.requirements.required),
                message: "No skill gap detected for this role.".to_string(),
            });
        }

        let ordered_gap = gap.ordered();
        let query = build_query(&gap, request.segment, request.education_preference.as_deref());
        debug!("search query for '{role}': {query}");

        let query_vector: Option<Vector> = match self.embedder.encode(&query) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("failed to embed search query for '{role}': {e}");
                None
            }
        };

        let ctx = ScoringContext {
            segment: request.segment,
            user_level: request.user_level,
            location: request.location.as_deref(),
            max_budget: request.max_budget,
            max_duration: request.max_duration,
            gap: &ordered_gap,
            pricing: &self.catalog.pricing,
        };

        let (recommendations, academic_recommendations, job_ideas) = match &query_vector {
            Some(q) => (
                self.search_courses(q, &ctx, request.top_n),
                self.search_academic(q, &ctx, request.top_n),
                self.search_jobs(q, &gap, role),
            ),
            None => (Vec::new(), Vec::new(), vec![JobIdea::service_unavailable()]),
        };

        let caveats = caveats(
            &recommendations,
            &academic_recommendations,
            request.max_budget,
            request.location.as_deref(),
        );

        let band = match vector {
            Some(v) => v.responsibility_band.min(MAX_BAND),
            None => rules::estimate_band(skills, 0.0),
        };

        let alternate_paths = gap
            .requirements
            .occupation
            .as_ref()
            .map(|o| self.catalog.taxonomy.alternates(o.index, ALTERNATE_NEIGHBOURS))
            .unwrap_or_default();

        let career_progression = progression::career_progression(
            role,
            band,
            skills,
            vector,
            &self.catalog.progressions,
            &alternate_paths,
        );

        let mentors = if skills.is_empty() {
            Vec::new()
        } else {
            mentors::match_mentors(&self.catalog.mentors, skills, MENTOR_LIMIT)
        };

        let readiness_vector = vector.cloned().unwrap_or_else(|| baseline_vector(request.segment));
        let readiness = rules::readiness(skills, &gap.requirements.required, &readiness_vector);

        let occupation_hierarchy = gap
            .requirements
            .occupation
            .as_ref()
            .map(|o| self.hierarchy_labels(&o.uri))
            .unwrap_or_default();

        let questions = generate_questions(&ordered_gap, &self.catalog.questions, &mut rand::thread_rng());

        RecommendationBundle::Incomplete(Box::new(FullBundle {
            mapped_occupation: gap.requirements.mapped_occupation.clone(),
            responsibility_band: band,
            compulsory_skills: gap.compulsory.iter().take(GAP_DISPLAY_LIMIT).cloned().collect(),
            optional_skills: gap.optional.iter().take(GAP_DISPLAY_LIMIT).cloned().collect(),
            questions,
            recommendations,
            academic_recommendations,
            job_ideas,
            mentors,
            alternate_paths,
            career_progression,
            salary_estimate: self.catalog.salaries.lookup(role),
            readiness,
            action_plan: action_plan(&ordered_gap, role),
            market_trends: (*self.market_trends(role)).clone(),
            caveats,
            top_ups: rules::top_ups(band, (band + 1).min(MAX_BAND), request.segment),
            occupation_hierarchy,
        }))
    }

    fn search_courses(&self, query: &[f32], ctx: &ScoringContext<'_>, top_n: usize) -> Vec<CourseRecommendation> {
        let scored = self
            .catalog
            .courses
            .search(query, top_n * COURSE_POOL_FACTOR)
            .into_iter()
            .map(|(course, similarity)| score_course(course, similarity, ctx))
            .collect();
        rank(scored, top_n)
    }

    fn search_academic(&self, query: &[f32], ctx: &ScoringContext<'_>, top_n: usize) -> Vec<CourseRecommendation> {
        let scored = self
            .catalog
            .academic
            .search(query, top_n * ACADEMIC_POOL_FACTOR)
            .into_iter()
            .map(|(course, similarity)| score_course(course, similarity, ctx).into_supplementary())
            .collect();
        rank(scored, top_n)
    }

    fn search_jobs(&self, query: &[f32], gap: &SkillGap, role: &str) -> Vec<JobIdea> {
        let core = gap.requirements.core_skills();
        let ideas: Vec<JobIdea> = self
            .catalog
            .jobs
            .search(query, JOB_SEARCH_LIMIT)
            .into_iter()
            .map(|(job, similarity)| self.job_idea(job, similarity, &core))
            .collect();

        if ideas.is_empty() {
            vec![JobIdea::no_openings(role)]
        } else {
            ideas
        }
    }

    fn job_idea(&self, job: &JobRecord, similarity: f32, core: &[String]) -> JobIdea {
        let posted = job.extracted_skills.as_deref().unwrap_or("").to_lowercase();
        let present = core
            .iter()
            .filter(|s| posted.contains(&s.to_lowercase()))
            .count();
        let overlap_pct = round_to(100.0 * present as f64 / core.len().max(1) as f64, 1);

        JobIdea {
            job_title: job.title.clone(),
            company: job
                .company
                .clone()
                .unwrap_or_else(|| "Lankan Employer".to_string()),
            location: job.location.clone(),
            deadline: Some(job.deadline.clone().unwrap_or_else(|| "Apply Soon".to_string())),
            url: Some(job.url.clone().unwrap_or_else(|| "#".to_string())),
            skill_gap_pct: Some(round_to(100.0 - overlap_pct, 1)),
            relevance_score: Some(round_to(f64::from(similarity), 3)),
            estimated_salary: Some(self.catalog.salaries.lookup(&job.title)),
            message: None,
        }
    }

    /// Broader-occupation labels, nearest parent first. Ancestors outside
    /// the occupation table are reported by URI.
    fn hierarchy_labels(&self, uri: &str) -> Vec<String> {
        let taxonomy = &self.catalog.taxonomy;
        taxonomy
            .broader_chain(uri)
            .into_iter()
            .map(|parent| {
                taxonomy
                    .occupation_by_uri(&parent)
                    .map(|o| o.preferred_label.clone())
                    .unwrap_or(parent)
            })
            .collect()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Stand-alone operations
    // ────────────────────────────────────────────────────────────────────────

    pub fn career_progression(
        &self,
        current_role: &str,
        band: u8,
        skills: &[String],
        vector: Option<&AssessmentVector>,
    ) -> Vec<ProgressionEntry> {
        let alternates = match self.catalog.taxonomy.find_occupation(current_role, self.embedder.as_ref()) {
            Ok(Some(hit)) => self.catalog.taxonomy.alternates(hit.index, ALTERNATE_NEIGHBOURS),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("no transitions for '{current_role}': {e}");
                Vec::new()
            }
        };
        progression::career_progression(
            current_role,
            band,
            skills,
            vector,
            &self.catalog.progressions,
            &alternates,
        )
    }

    pub fn match_mentors(&self, skills: &[String], top_n: usize) -> Vec<MentorMatch> {
        mentors::match_mentors(&self.catalog.mentors, skills, top_n)
    }

    pub fn suggest_mentors(&self, sector_or_role: &str) -> Vec<String> {
        mentors::suggest_mentors(&self.catalog.mentors, sector_or_role)
    }

    pub fn readiness_score(&self, skills: &[String], vector: &AssessmentVector, target_role: &str) -> ReadinessBreakdown {
        let requirements = resolve_requirements(target_role, &self.catalog, self.embedder.as_ref());
        rules::readiness(skills, &requirements.required, vector)
    }

    pub fn salary_for_role(&self, title: &str) -> String {
        self.catalog.salaries.lookup(title)
    }

    pub fn transferability(&self, current_role: &str, target_role: &str) -> TransferabilityReport {
        let current = resolve_requirements(current_role, &self.catalog, self.embedder.as_ref());
        let target = resolve_requirements(target_role, &self.catalog, self.embedder.as_ref());
        rules::transferability(&current.required, &target.required)
    }

    pub fn career_direction(&self, interests: &[String]) -> Vec<String> {
        rules::career_direction(interests)
    }

    /// Nearest occupation for a skill profile; "Unknown" without skills or
    /// when the profile cannot be encoded.
    pub fn auto_profile(&self, skills: &[String]) -> String {
        if skills.is_empty() {
            return UNKNOWN_PROFILE.to_string();
        }
        let text = format!("Experienced professional skilled in: {}", skills.join(", "));
        match self.embedder.encode(&text) {
            Ok(query) => self
                .catalog
                .taxonomy
                .occupation_match(&query)
                .map(|o| o.label)
                .unwrap_or_else(|| UNKNOWN_PROFILE.to_string()),
            Err(e) => {
                warn!("auto-profile encode failed: {e}");
                UNKNOWN_PROFILE.to_string()
            }
        }
    }

    pub fn market_trends(&self, role: &str) -> Arc<MarketTrends> {
        let field = detect_field(role);
        self.trend_cache.get_or_compute(field, || {
            let (segments, subset) = self.trends.trends_by_field(field, self.catalog.jobs.rows());
            let top_demanded_skills = self.trends.hot_skills(HOT_SKILL_COUNT, &subset);
            MarketTrends {
                field,
                segments,
                top_demanded_skills,
            }
        })
    }

    pub fn cached_trend_fields(&self) -> usize {
        self.trend_cache.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn query_term(skill: &str) -> String {
    if skill.chars().count() > MAX_QUERY_TERM_CHARS {
        skill
            .split_whitespace()
            .take(LONG_TERM_WORDS)
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        skill.to_string()
    }
}

/// One query string for all three corpora.
fn build_query(gap: &SkillGap, segment: Segment, education_preference: Option<&str>) -> String {
    let mut terms: Vec<String> = gap
        .compulsory
        .iter()
        .take(QUERY_COMPULSORY_TERMS)
        .map(|s| query_term(s))
        .collect();
    terms.extend(gap.optional.iter().take(QUERY_OPTIONAL_TERMS).map(|s| query_term(s)));

    if segment == Segment::Student {
        terms.push(STUDENT_QUERY_BOOST.to_string());
    }
    if let Some(pref) = education_preference.map(str::trim).filter(|p| !p.is_empty() && *p != "None") {
        terms.push(pref.to_string());
    }
    terms.join(" ")
}

/// The vector assumed when a caller supplies none: no experience, status by segment.
fn baseline_vector(segment: Segment) -> AssessmentVector {
    AssessmentVector {
        status_level: if segment == Segment::Student { 1 } else { 2 },
        experience_years: 0.0,
        ..Default::default()
    }
}

fn caveats(
    courses: &[CourseRecommendation],
    academic: &[CourseRecommendation],
    max_budget: Option<f64>,
    location: Option<&str>,
) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(budget) = max_budget {
        let cheapest = courses
            .iter()
            .chain(academic)
            .map(|c| c.fee_numeric)
            .filter(|fee| *fee > 0.0)
            .min_by(f64::total_cmp);
        if cheapest.is_some_and(|fee| fee > budget) {
            out.push("Note: Most programs exceed your budget. Target State Universities or OUSL.".to_string());
        }
    }

    if let Some(wanted) = location.map(str::trim).filter(|l| !l.is_empty()) {
        let lowered = wanted.to_lowercase();
        let mut all = courses.iter().chain(academic).peekable();
        let any_results = all.peek().is_some();
        let matched = all.any(|c| c.location.to_lowercase().contains(&lowered));
        if any_results && !matched {
            out.push(format!(
                "No direct matches in {}, showing Online options.",
                title_case(wanted)
            ));
        }
    }
    out
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
