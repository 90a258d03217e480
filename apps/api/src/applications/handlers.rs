//! Axum route handlers for the application tracker.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationUpdate, NewApplication};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// POST /api/v1/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    Json(request): Json<NewApplication>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::Validation("userId cannot be empty".to_string()));
    }
    if state.store.get_job(request.job_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Job {} not found", request.job_id)));
    }
    let application = state.store.create_application(request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/applications?userId=
pub async fn handle_list_user_applications(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<Application>>, AppError> {
    Ok(Json(
        state
            .store
            .list_applications_for_user(&params.user_id)
            .await?,
    ))
}

/// GET /api/v1/jobs/:id/applications
pub async fn handle_list_job_applications(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<Application>>, AppError> {
    Ok(Json(state.store.list_applications_for_job(job_id).await?))
}

/// PATCH /api/v1/applications/:id
pub async fn handle_update_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ApplicationUpdate>,
) -> Result<Json<Application>, AppError> {
    let application = state
        .store
        .update_application(id, update, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;
    Ok(Json(application))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_application(id).await? {
        return Err(AppError::NotFound(format!("Application {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
