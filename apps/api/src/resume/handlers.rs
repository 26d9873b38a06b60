use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::matching::handlers::run_blocking;
use crate::resume::{pdf_text, profile_text, ResumeError, ResumeProfile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResumeTextRequest {
    pub text: String,
}

/// POST /api/v1/resume/profile
///
/// Multipart upload; the PDF is read from the `file` part.
pub async fn handle_profile_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeProfile>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;
            upload = Some(bytes);
            break;
        }
    }

    let bytes = upload.ok_or_else(|| AppError::Validation("multipart field 'file' is required".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Resume(ResumeError::Empty));
    }
    info!("Profiling uploaded resume ({} bytes)", bytes.len());

    let profile = run_blocking(&state.engine, move |engine| {
        pdf_text(&bytes).map(|text| profile_text(engine, &text))
    })
    .await??;
    Ok(Json(profile))
}

/// POST /api/v1/resume/profile-text
pub async fn handle_profile_text(
    State(state): State<AppState>,
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<ResumeProfile>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let profile = run_blocking(&state.engine, move |engine| profile_text(engine, &request.text)).await?;
    Ok(Json(profile))
}
