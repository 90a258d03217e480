use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Last fetch time per source. One row per source name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SourceFetchLog {
    pub source: String,
    pub last_fetched_at: DateTime<Utc>,
    pub job_count: i32,
}

/// Append-only summary of one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FetchRunLog {
    pub id: Uuid,
    pub inserted_count: i32,
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
}
