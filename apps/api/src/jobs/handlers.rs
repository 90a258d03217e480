//! Axum route handlers for the job board.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::normalize::DEFAULT_LOCATION;
use crate::models::job::{JobPosting, JobStatus, JobTag, JobUpdate, NewJobPosting};
use crate::state::AppState;
use crate::store::InsertOutcome;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: JobStatus,
    pub tag: Option<JobTag>,
    pub logo_url: Option<String>,
    pub user_id: String,
}

impl CreateJobRequest {
    fn into_new_posting(self) -> Result<NewJobPosting, AppError> {
        let title = required("title", &self.title)?;
        let company = required("company", &self.company)?;
        let user_id = required("userId", &self.user_id)?;
        let location = match self.location.trim() {
            "" => DEFAULT_LOCATION.to_string(),
            other => other.to_string(),
        };
        Ok(NewJobPosting {
            title,
            company,
            location,
            description: self.description,
            status: self.status,
            tag: self.tag,
            logo_url: self.logo_url,
            inserting_user_id: user_id,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobPosting>), AppError> {
    let posting = request.into_new_posting()?;
    match state.store.insert_job(posting, Utc::now()).await? {
        InsertOutcome::Inserted(job) => Ok((StatusCode::CREATED, Json(job))),
        InsertOutcome::Duplicate => Err(AppError::Conflict(
            "A job with this title, company and location already exists".to_string(),
        )),
    }
}

/// GET /api/v1/jobs
/// Lists open jobs only.
pub async fn handle_list_open_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    Ok(Json(state.store.list_jobs_by_status(JobStatus::Open).await?))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}

/// PATCH /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut update): Json<JobUpdate>,
) -> Result<Json<JobPosting>, AppError> {
    // Stored trimmed, same as on create, so the dedup key stays exact.
    for (field, value) in [
        ("title", &mut update.title),
        ("company", &mut update.company),
        ("location", &mut update.location),
    ] {
        if let Some(raw) = value.take() {
            *value = Some(required(field, &raw)?);
        }
    }

    let job = state
        .store
        .update_job(id, update, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_job(id).await? {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
