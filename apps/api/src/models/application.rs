use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum ApplicationStatus {
    Shortlisted,
    Applied,
    Interviewing,
    Offer,
    Rejected,
    Accepted,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub user_id: String,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub saved_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub user_id: String,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

/// Status change. Notes are overwritten, including with `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationUpdate {
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}
