use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::feedback::Feedback;

/// Deleting a résumé only flips it to `Deleted`; the row stays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum ResumeStatus {
    #[default]
    Active,
    Archived,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: Uuid,
    pub user_id: String,
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    /// Key of the uploaded file in the client's blob storage.
    pub file_storage_id: String,
    pub feedback: Option<Json<Feedback>>,
    pub status: ResumeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResume {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub job_description: String,
    pub file_storage_id: String,
}
