pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment
        .route(
            "/api/v1/assessment/vectorize",
            post(handlers::handle_vectorize),
        )
        // Recommendations
        .route("/api/v1/recommendations", post(handlers::handle_recommend))
        .route(
            "/api/v1/recommendations/assessment",
            post(handlers::handle_recommend_from_assessment),
        )
        // Stand-alone career tools
        .route("/api/v1/progression", post(handlers::handle_progression))
        .route("/api/v1/mentors/match", post(handlers::handle_match_mentors))
        .route(
            "/api/v1/mentors/suggest",
            get(handlers::handle_suggest_mentors),
        )
        .route("/api/v1/readiness", post(handlers::handle_readiness))
        .route("/api/v1/salary", get(handlers::handle_salary))
        .route(
            "/api/v1/transferability",
            post(handlers::handle_transferability),
        )
        .route(
            "/api/v1/career-direction",
            post(handlers::handle_career_direction),
        )
        .route("/api/v1/trends", get(handlers::handle_market_trends))
        // Resume profiling
        .route("/api/v1/resume/profile", post(resume::handle_profile_pdf))
        .route(
            "/api/v1/resume/profile-text",
            post(resume::handle_profile_text),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{Config, EmbeddingBackend};
    use crate::embedding::EmbeddingProvider;
    use crate::matching::engine::Engine;
    use crate::matching::trends::KeywordTrendAnalyzer;
    use crate::test_support::{self, CountingEmbedder};

    fn test_state() -> AppState {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(CountingEmbedder::new(256));
        let catalog = test_support::catalog(embedder.as_ref());
        AppState {
            engine: Arc::new(Engine::new(catalog, embedder, Box::new(KeywordTrendAnalyzer))),
            config: Config {
                data_dir: PathBuf::from("data"),
                models_dir: PathBuf::from("models"),
                embedding_backend: EmbeddingBackend::Hashing,
                embedding_dimensions: 256,
                force_refresh: false,
                port: 0,
                rust_log: "info".to_string(),
            },
        }
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_service_and_catalog() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "pathfinder");
        assert_eq!(body["catalog"]["occupations"], 5);
    }

    #[tokio::test]
    async fn test_recommend_rejects_empty_role() {
        let (status, body) = send(post_json(
            "/api/v1/recommendations",
            json!({ "target_role": "  ", "user_skills": ["python"] }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_recommend_rejects_zero_top_n() {
        let (status, _) = send(post_json(
            "/api/v1/recommendations",
            json!({ "target_role": "software developer", "top_n": 0 }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_recommend_returns_tagged_bundle() {
        let (status, body) = send(post_json(
            "/api/v1/recommendations",
            json!({ "target_role": "software developer", "user_skills": ["python"] }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Incomplete");
        assert_eq!(body["mapped_occupation"], "software developer");
        assert!(body["job_ideas"].as_array().is_some_and(|jobs| !jobs.is_empty()));
    }

    #[tokio::test]
    async fn test_assessment_recommend_needs_vector_or_answers() {
        let (status, _) = send(post_json(
            "/api/v1/recommendations/assessment",
            json!({ "target_role": "software developer" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assessment_recommend_from_vector() {
        let (status, body) = send(post_json(
            "/api/v1/recommendations/assessment",
            json!({
                "target_role": "software developer",
                "vector": { "status_level": 0, "extracted_intent_skills": ["python"] }
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Incomplete");
    }

    #[tokio::test]
    async fn test_salary_lookup_uses_sentinel_for_unknown_titles() {
        let (status, body) = send(get("/api/v1/salary?title=Data%20Analyst")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["salary"], "100,000 - 200,000 LKR");

        let (_, body) = send(get("/api/v1/salary?title=Astronaut")).await;
        assert_eq!(body["salary"], "Data Not Available");
    }

    #[tokio::test]
    async fn test_progression_is_never_empty() {
        let (status, body) = send(post_json(
            "/api/v1/progression",
            json!({ "current_role": "Software Developer", "skills": ["python"] }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().is_some_and(|entries| !entries.is_empty()));
    }

    #[tokio::test]
    async fn test_career_direction_default() {
        let (status, body) = send(post_json("/api/v1/career-direction", json!({ "interests": [] }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["General Management / Social Sciences"]));
    }

    #[tokio::test]
    async fn test_transferability_requires_both_roles() {
        let (status, _) = send(post_json(
            "/api/v1/transferability",
            json!({ "current_role": "Data Analyst", "target_role": "" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_resume_text_profile() {
        let (status, body) = send(post_json(
            "/api/v1/resume/profile-text",
            json!({ "text": "Nurse with patient care and Excel reporting" }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extracted_skills"], json!(["Excel", "Patient Care"]));
    }

    #[tokio::test]
    async fn test_resume_upload_requires_file_part() {
        let boundary = "pathfinder-boundary";
        let payload = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resume/profile")
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(payload))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
