//! Axum route handlers for a user's stored résumés.
//!
//! Every route acts on the caller's own résumés; the owner comes from the
//! forwarded `x-user-id` header.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::feedback::handlers::NormalizeRequest;
use crate::feedback::normalize_feedback;
use crate::models::resume::{NewResume, Resume, ResumeStatus};
use crate::routes::guard::require_user;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResumeListQuery {
    #[serde(default)]
    pub status: ResumeStatus,
}

/// Loads a résumé for a mutation by `owner`: 404 when missing, 403 when
/// someone else owns it.
async fn load_owned(state: &AppState, id: Uuid, owner: &str) -> Result<Resume, AppError> {
    let resume = state
        .store
        .get_resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    if resume.user_id != owner {
        return Err(AppError::Forbidden(format!("Resume {id} belongs to another user")));
    }
    Ok(resume)
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<NewResume>,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let owner = require_user(&headers)?;
    if request.file_storage_id.trim().is_empty() {
        return Err(AppError::Validation(
            "fileStorageId cannot be empty".to_string(),
        ));
    }
    let resume = state
        .store
        .create_resume(&owner, request, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes?status=active|archived
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ResumeListQuery>,
) -> Result<Json<Vec<Resume>>, AppError> {
    let owner = require_user(&headers)?;
    if query.status == ResumeStatus::Deleted {
        return Err(AppError::Validation(
            "deleted resumes cannot be listed".to_string(),
        ));
    }
    Ok(Json(
        state
            .store
            .list_resumes_for_user(&owner, query.status)
            .await?,
    ))
}

/// GET /api/v1/resumes/:id
/// Someone else's résumé reads as missing.
pub async fn handle_get_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Resume>, AppError> {
    let owner = require_user(&headers)?;
    let resume = state
        .store
        .get_resume(id)
        .await?
        .filter(|r| r.user_id == owner)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(resume))
}

/// POST /api/v1/resumes/:id/archive
pub async fn handle_archive_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Resume>, AppError> {
    let owner = require_user(&headers)?;
    load_owned(&state, id, &owner).await?;
    let resume = state
        .store
        .set_resume_status(id, ResumeStatus::Archived, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:id
/// Soft delete: the row stays with status `deleted`.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let owner = require_user(&headers)?;
    load_owned(&state, id, &owner).await?;
    state
        .store
        .set_resume_status(id, ResumeStatus::Deleted, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/resumes/:id/feedback
///
/// Takes the raw model output, normalizes it, and stores the result.
pub async fn handle_update_resume_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<NormalizeRequest>,
) -> Result<Json<Resume>, AppError> {
    let owner = require_user(&headers)?;
    load_owned(&state, id, &owner).await?;
    let feedback = normalize_feedback(&request.raw);
    let resume = state
        .store
        .set_resume_feedback(id, feedback, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(resume))
}
