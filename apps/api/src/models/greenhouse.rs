use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A company whose Greenhouse job board is polled during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GreenhouseCompany {
    pub id: Uuid,
    pub handle: String,
    pub name: String,
    pub url: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGreenhouseCompany {
    pub handle: String,
    pub name: String,
    pub url: Option<String>,
}
