use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and the loaded catalog's shape.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let catalog = state.engine.catalog();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "pathfinder",
        "embedding_model": state.engine.model_id(),
        "data_dir": state.config.data_dir.display().to_string(),
        "catalog": {
            "occupations": catalog.taxonomy.occupation_count(),
            "jobs": catalog.jobs.len(),
            "courses": catalog.courses.len(),
            "academic_courses": catalog.academic.len(),
            "mentors": catalog.mentors.len(),
        },
        "cached_trend_fields": state.engine.cached_trend_fields(),
    }))
}
