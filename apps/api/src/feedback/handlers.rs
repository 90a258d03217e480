use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::feedback::normalize_feedback;
use crate::models::feedback::Feedback;

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    #[serde(default)]
    pub raw: Value,
}

/// POST /api/v1/feedback/normalize
pub async fn handle_normalize_feedback(Json(request): Json<NormalizeRequest>) -> Json<Feedback> {
    Json(normalize_feedback(&request.raw))
}
