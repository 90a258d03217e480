//! Admin routes for the Greenhouse boards polled during ingestion.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::greenhouse::{GreenhouseCompany, NewGreenhouseCompany};
use crate::routes::guard::{require_internal_key, ApiKeyQuery};
use crate::state::AppState;

/// GET /api/v1/greenhouse/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
) -> Result<Json<Vec<GreenhouseCompany>>, AppError> {
    Ok(Json(state.store.list_greenhouse_companies().await?))
}

/// POST /api/v1/greenhouse/companies?apiKey=...
pub async fn handle_add_company(
    State(state): State<AppState>,
    Query(query): Query<ApiKeyQuery>,
    Json(request): Json<NewGreenhouseCompany>,
) -> Result<(StatusCode, Json<GreenhouseCompany>), AppError> {
    require_internal_key(&state.config, query.api_key.as_deref())?;

    let handle = request.handle.trim().to_lowercase();
    if handle.is_empty() || handle.contains('/') {
        return Err(AppError::Validation(
            "handle must be a non-empty board token".to_string(),
        ));
    }
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let company = state
        .store
        .add_greenhouse_company(
            NewGreenhouseCompany {
                handle,
                name,
                url: request.url,
            },
            Utc::now(),
        )
        .await?;
    tracing::info!("Added Greenhouse board '{}'", company.handle);
    Ok((StatusCode::CREATED, Json(company)))
}

/// DELETE /api/v1/greenhouse/companies/:id?apiKey=...
pub async fn handle_remove_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ApiKeyQuery>,
) -> Result<StatusCode, AppError> {
    require_internal_key(&state.config, query.api_key.as_deref())?;

    if !state.store.remove_greenhouse_company(id).await? {
        return Err(AppError::NotFound(format!("Greenhouse company {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
