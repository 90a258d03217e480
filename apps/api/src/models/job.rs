use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Open,
    Closed,
    Draft,
}

/// UI filtering label. Not computed by any matching logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum JobTag {
    #[serde(rename = "MATCH")]
    #[sqlx(rename = "MATCH")]
    Match,
    #[default]
    #[serde(rename = "RECOMMENDED")]
    #[sqlx(rename = "RECOMMENDED")]
    Recommended,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub status: JobStatus,
    pub tag: Option<JobTag>,
    pub logo_url: Option<String>,
    pub inserting_user_id: String,
    pub posted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload shared by ingestion and the create endpoint.
#[derive(Debug, Clone)]
pub struct NewJobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub status: JobStatus,
    pub tag: Option<JobTag>,
    pub logo_url: Option<String>,
    pub inserting_user_id: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<JobStatus>,
    pub tag: Option<JobTag>,
    pub logo_url: Option<String>,
}

impl JobUpdate {
    pub fn apply(self, job: &mut JobPosting) {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(company) = self.company {
            job.company = company;
        }
        if let Some(location) = self.location {
            job.location = location;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if self.tag.is_some() {
            job.tag = self.tag;
        }
        if self.logo_url.is_some() {
            job.logo_url = self.logo_url;
        }
    }
}
