//! Axum route handlers for the recommendation engine.
//!
//! Every engine call is synchronous (and may block on a remote encoder), so
//! each handler validates its input and then moves the work onto the
//! blocking pool.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assessment::{Answers, AssessmentVector};
use crate::errors::AppError;
use crate::matching::bundle::RecommendationBundle;
use crate::matching::engine::{Engine, RecommendRequest};
use crate::matching::mentors::MentorMatch;
use crate::matching::progression::ProgressionEntry;
use crate::matching::rules::{estimate_band, ReadinessBreakdown, TransferabilityReport};
use crate::matching::trends::MarketTrends;
use crate::state::AppState;

/// Runs `f` against the engine on the blocking pool.
pub(crate) async fn run_blocking<T, F>(engine: &Arc<Engine>, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&Engine) -> T + Send + 'static,
{
    let engine = Arc::clone(engine);
    tokio::task::spawn_blocking(move || f(&engine))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in engine call: {e}")))
}

fn log_bundle(bundle: &RecommendationBundle) {
    let live_jobs = match bundle {
        RecommendationBundle::Incomplete(full) => full.job_ideas.iter().filter(|j| !j.is_placeholder()).count(),
        RecommendationBundle::Complete(_) => 0,
    };
    info!(
        "Recommendation for '{}' (complete: {}, live job ideas: {live_jobs})",
        bundle.mapped_occupation(),
        bundle.is_complete()
    );
}

fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VectorizeRequest {
    pub answers: Answers,
}

#[derive(Debug, Deserialize)]
pub struct AssessmentRecommendRequest {
    pub target_role: String,
    /// A vector from a previous `/assessment/vectorize` call.
    #[serde(default)]
    pub vector: Option<AssessmentVector>,
    /// Raw answers, vectorised first when no vector is supplied.
    #[serde(default)]
    pub answers: Option<Answers>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressionRequest {
    pub current_role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Defaults to the assessment's band, else an estimate from the skills.
    #[serde(default)]
    pub band: Option<u8>,
    #[serde(default)]
    pub assessment: Option<AssessmentVector>,
}

fn default_mentor_count() -> usize {
    3
}

#[derive(Debug, Deserialize)]
pub struct MentorMatchRequest {
    pub skills: Vec<String>,
    #[serde(default = "default_mentor_count")]
    pub top_n: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReadinessRequest {
    pub target_role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub assessment: AssessmentVector,
}

#[derive(Debug, Deserialize)]
pub struct SalaryQuery {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct SalaryResponse {
    pub title: String,
    pub salary: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferabilityRequest {
    pub current_role: String,
    pub target_role: String,
}

#[derive(Debug, Deserialize)]
pub struct CareerDirectionRequest {
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SectorQuery {
    #[serde(default)]
    pub sector: String,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    #[serde(default)]
    pub role: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessment/vectorize
pub async fn handle_vectorize(
    State(state): State<AppState>,
    Json(request): Json<VectorizeRequest>,
) -> Result<Json<AssessmentVector>, AppError> {
    let vector = run_blocking(&state.engine, move |engine| engine.vectorize_assessment(&request.answers)).await?;
    Ok(Json(vector))
}

/// POST /api/v1/recommendations
///
/// Full recommendation bundle for a skill set and target role. Returns a
/// `Complete` bundle without searching when the user has no gap.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendationBundle>, AppError> {
    require_text(&request.target_role, "target_role")?;
    if request.top_n == 0 {
        return Err(AppError::Validation("top_n must be at least 1".to_string()));
    }

    let bundle = run_blocking(&state.engine, move |engine| engine.recommend(&request)).await?;
    log_bundle(&bundle);
    Ok(Json(bundle))
}

/// POST /api/v1/recommendations/assessment
///
/// Same bundle, with segment, level, budget and skills derived from an
/// assessment vector (or from raw answers, vectorised on the way).
pub async fn handle_recommend_from_assessment(
    State(state): State<AppState>,
    Json(request): Json<AssessmentRecommendRequest>,
) -> Result<Json<RecommendationBundle>, AppError> {
    require_text(&request.target_role, "target_role")?;
    if request.vector.is_none() && request.answers.is_none() {
        return Err(AppError::Validation(
            "either vector or answers must be provided".to_string(),
        ));
    }

    let bundle = run_blocking(&state.engine, move |engine| {
        let vector = match (request.vector, request.answers) {
            (Some(vector), _) => vector,
            (None, Some(answers)) => engine.vectorize_assessment(&answers),
            (None, None) => AssessmentVector::default(),
        };
        engine.recommend_from_assessment(vector, &request.target_role)
    })
    .await?;
    log_bundle(&bundle);
    Ok(Json(bundle))
}

/// POST /api/v1/progression
pub async fn handle_progression(
    State(state): State<AppState>,
    Json(request): Json<ProgressionRequest>,
) -> Result<Json<Vec<ProgressionEntry>>, AppError> {
    require_text(&request.current_role, "current_role")?;

    let entries = run_blocking(&state.engine, move |engine| {
        let band = request.band.unwrap_or_else(|| match &request.assessment {
            Some(v) => v.responsibility_band,
            None => estimate_band(&request.skills, 0.0),
        });
        engine.career_progression(
            &request.current_role,
            band,
            &request.skills,
            request.assessment.as_ref(),
        )
    })
    .await?;
    Ok(Json(entries))
}

/// POST /api/v1/mentors/match
pub async fn handle_match_mentors(
    State(state): State<AppState>,
    Json(request): Json<MentorMatchRequest>,
) -> Result<Json<Vec<MentorMatch>>, AppError> {
    let matches = run_blocking(&state.engine, move |engine| {
        engine.match_mentors(&request.skills, request.top_n)
    })
    .await?;
    Ok(Json(matches))
}

/// GET /api/v1/mentors/suggest?sector=
pub async fn handle_suggest_mentors(
    State(state): State<AppState>,
    Query(query): Query<SectorQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let names = run_blocking(&state.engine, move |engine| engine.suggest_mentors(&query.sector)).await?;
    Ok(Json(names))
}

/// POST /api/v1/readiness
pub async fn handle_readiness(
    State(state): State<AppState>,
    Json(request): Json<ReadinessRequest>,
) -> Result<Json<ReadinessBreakdown>, AppError> {
    require_text(&request.target_role, "target_role")?;

    let breakdown = run_blocking(&state.engine, move |engine| {
        engine.readiness_score(&request.skills, &request.assessment, &request.target_role)
    })
    .await?;
    Ok(Json(breakdown))
}

/// GET /api/v1/salary?title=
///
/// Never 404s: an unknown title yields the "Data Not Available" sentinel.
pub async fn handle_salary(
    State(state): State<AppState>,
    Query(query): Query<SalaryQuery>,
) -> Result<Json<SalaryResponse>, AppError> {
    let salary = state.engine.salary_for_role(&query.title);
    Ok(Json(SalaryResponse {
        title: query.title,
        salary,
    }))
}

/// POST /api/v1/transferability
pub async fn handle_transferability(
    State(state): State<AppState>,
    Json(request): Json<TransferabilityRequest>,
) -> Result<Json<TransferabilityReport>, AppError> {
    require_text(&request.current_role, "current_role")?;
    require_text(&request.target_role, "target_role")?;

    let report = run_blocking(&state.engine, move |engine| {
        engine.transferability(&request.current_role, &request.target_role)
    })
    .await?;
    Ok(Json(report))
}

/// POST /api/v1/career-direction
pub async fn handle_career_direction(
    State(state): State<AppState>,
    Json(request): Json<CareerDirectionRequest>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.engine.career_direction(&request.interests)))
}

/// GET /api/v1/trends?role=
pub async fn handle_market_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<MarketTrends>, AppError> {
    let trends = run_blocking(&state.engine, move |engine| engine.market_trends(&query.role)).await?;
    Ok(Json((*trends).clone()))
}
