//! Axum route handlers for triggering and inspecting ingestion.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::ingest::IngestOutcome;
use crate::models::fetch_log::{FetchRunLog, SourceFetchLog};
use crate::routes::guard::{forwarded_user, require_internal_key, ApiKeyQuery};
use crate::state::AppState;

const DEFAULT_RUN_LIMIT: i64 = 20;
const MAX_RUN_LIMIT: i64 = 200;

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub status: &'static str,
    pub result: IngestOutcome,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RunLogQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/jobs/fetch?apiKey=...
///
/// Runs ingestion on demand. The run itself never fails; a gated run comes
/// back as `result.status = "skipped"`.
pub async fn handle_fetch_jobs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ApiKeyQuery>,
) -> Result<Json<TriggerResponse>, AppError> {
    require_internal_key(&state.config, query.api_key.as_deref())?;

    let result = state.ingestor.run(forwarded_user(&headers)).await;

    Ok(Json(TriggerResponse {
        status: "ok",
        result,
        message: "Triggered job ingestion",
    }))
}

/// GET /api/v1/ingest/sources
pub async fn handle_list_sources(
    State(state): State<AppState>,
) -> Result<Json<Vec<SourceFetchLog>>, AppError> {
    Ok(Json(state.store.list_source_logs().await?))
}

/// GET /api/v1/ingest/runs?limit=
pub async fn handle_list_runs(
    State(state): State<AppState>,
    Query(query): Query<RunLogQuery>,
) -> Result<Json<Vec<FetchRunLog>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_RUN_LIMIT);
    if !(1..=MAX_RUN_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_RUN_LIMIT}"
        )));
    }
    Ok(Json(state.store.list_run_logs(limit).await?))
}
