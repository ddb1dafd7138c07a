//! Axum route handlers for the Resume API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resume::service::{get_resume, improve_section, save_resume, ImproveOutcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveResumeRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct GetResumeResponse {
    /// `null` until the user saves for the first time.
    pub resume: Option<ResumeRow>,
}

#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub current: String,
    #[serde(rename = "type")]
    pub section_type: String,
}

#[derive(Debug, Serialize)]
pub struct ImproveResponse {
    pub content: String,
    /// False when every model failed and `content` is the submitted text.
    pub improved: bool,
    pub model: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<GetResumeResponse>, AppError> {
    let resume = get_resume(
        state.store.as_ref(),
        state.view_cache.as_ref(),
        identity.as_deref(),
    )
    .await?;
    Ok(Json(GetResumeResponse { resume }))
}

/// PUT /api/v1/resume
pub async fn handle_save_resume(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<SaveResumeRequest>,
) -> Result<Json<ResumeRow>, AppError> {
    let resume = save_resume(
        state.store.as_ref(),
        state.view_cache.as_ref(),
        identity.as_deref(),
        &request.content,
    )
    .await?;
    Ok(Json(resume))
}

/// POST /api/v1/resume/improve
///
/// Best-effort: a 200 with `improved: false` means the AI step failed and the
/// submitted text was echoed back.
pub async fn handle_improve(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<ImproveRequest>,
) -> Result<Json<ImproveResponse>, AppError> {
    if request.current.trim().is_empty() {
        return Err(AppError::Validation("current cannot be empty".to_string()));
    }

    let improved = improve_section(
        state.store.as_ref(),
        &state.llm,
        identity.as_deref(),
        &request.current,
        &request.section_type,
    )
    .await?;

    let model = match improved.outcome {
        ImproveOutcome::Generated { model } => Some(model),
        ImproveOutcome::OriginalReturned => None,
    };

    Ok(Json(ImproveResponse {
        content: improved.content,
        improved: model.is_some(),
        model,
    }))
}
