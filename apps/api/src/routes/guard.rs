use axum::http::HeaderMap;
use serde::Deserialize;

use crate::config::Config;
use crate::errors::AppError;

/// Header an upstream identity layer uses to forward the authenticated subject.
pub const USER_ID_HEADER: &str = "x-user-id";

/// `?apiKey=` on routes guarded by the internal key.
#[derive(Debug, Deserialize)]
pub struct ApiKeyQuery {
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

/// Checks the static internal API key used by the ingestion trigger and
/// admin mutations.
pub fn require_internal_key(config: &Config, provided: Option<&str>) -> Result<(), AppError> {
    match provided {
        Some(key) if !key.is_empty() && key == config.internal_api_key => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

/// The forwarded subject, if any. Blank values count as absent.
pub fn forwarded_user(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Like `forwarded_user`, for routes that act on the caller's own records.
pub fn require_user(headers: &HeaderMap) -> Result<String, AppError> {
    forwarded_user(headers).ok_or(AppError::Unauthorized)
}
