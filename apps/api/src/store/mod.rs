//! Document store contract for the job board.
//!
//! Handlers and the ingestion batch only talk to `JobBoardStore`; the
//! Postgres implementation lives in `postgres`. `AppState` carries it as
//! `Arc<dyn JobBoardStore>`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationUpdate, NewApplication};
use crate::models::fetch_log::{FetchRunLog, SourceFetchLog};
use crate::models::greenhouse::{GreenhouseCompany, NewGreenhouseCompany};
use crate::models::feedback::Feedback;
use crate::models::job::{JobPosting, JobStatus, JobUpdate, NewJobPosting};
use crate::models::resume::{NewResume, Resume, ResumeStatus};
use crate::models::user::{User, UserProfile, UserUpdate};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::NotFound(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Result of an insert guarded by the `(title, company, location)` key.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(JobPosting),
    Duplicate,
}

#[async_trait]
pub trait JobBoardStore: Send + Sync {
    // Jobs

    async fn find_job_by_key(
        &self,
        title: &str,
        company: &str,
        location: &str,
    ) -> Result<Option<JobPosting>, StoreError>;

    /// Inserts unless a posting with the same exact key already exists.
    /// Atomic with respect to concurrent inserts of the same key.
    async fn insert_job(
        &self,
        job: NewJobPosting,
        now: DateTime<Utc>,
    ) -> Result<InsertOutcome, StoreError>;

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError>;

    async fn list_jobs_by_status(&self, status: JobStatus) -> Result<Vec<JobPosting>, StoreError>;

    async fn update_job(
        &self,
        id: Uuid,
        update: JobUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<JobPosting>, StoreError>;

    async fn delete_job(&self, id: Uuid) -> Result<bool, StoreError>;

    // Fetch logs

    async fn get_source_log(&self, source: &str) -> Result<Option<SourceFetchLog>, StoreError>;

    async fn upsert_source_log(
        &self,
        source: &str,
        fetched_at: DateTime<Utc>,
        job_count: i32,
    ) -> Result<(), StoreError>;

    async fn list_source_logs(&self) -> Result<Vec<SourceFetchLog>, StoreError>;

    async fn insert_run_log(
        &self,
        inserted_count: i32,
        warnings: &[String],
        at: DateTime<Utc>,
    ) -> Result<FetchRunLog, StoreError>;

    /// Newest first.
    async fn list_run_logs(&self, limit: i64) -> Result<Vec<FetchRunLog>, StoreError>;

    // Greenhouse companies

    async fn list_greenhouse_companies(&self) -> Result<Vec<GreenhouseCompany>, StoreError>;

    async fn add_greenhouse_company(
        &self,
        company: NewGreenhouseCompany,
        now: DateTime<Utc>,
    ) -> Result<GreenhouseCompany, StoreError>;

    async fn remove_greenhouse_company(&self, id: Uuid) -> Result<bool, StoreError>;

    // Applications

    async fn create_application(
        &self,
        application: NewApplication,
        now: DateTime<Utc>,
    ) -> Result<Application, StoreError>;

    async fn list_applications_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Application>, StoreError>;

    async fn list_applications_for_job(&self, job_id: Uuid)
        -> Result<Vec<Application>, StoreError>;

    async fn update_application(
        &self,
        id: Uuid,
        update: ApplicationUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Application>, StoreError>;

    async fn delete_application(&self, id: Uuid) -> Result<bool, StoreError>;

    // Résumés

    async fn create_resume(
        &self,
        user_id: &str,
        resume: NewResume,
        now: DateTime<Utc>,
    ) -> Result<Resume, StoreError>;

    async fn get_resume(&self, id: Uuid) -> Result<Option<Resume>, StoreError>;

    /// Newest first.
    async fn list_resumes_for_user(
        &self,
        user_id: &str,
        status: ResumeStatus,
    ) -> Result<Vec<Resume>, StoreError>;

    async fn set_resume_status(
        &self,
        id: Uuid,
        status: ResumeStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Resume>, StoreError>;

    async fn set_resume_feedback(
        &self,
        id: Uuid,
        feedback: Feedback,
        now: DateTime<Utc>,
    ) -> Result<Option<Resume>, StoreError>;

    // Users

    /// Returns the new row, or `None` when the user already exists.
    async fn insert_user_if_absent(
        &self,
        user_id: &str,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    async fn upsert_user(
        &self,
        user_id: &str,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Result<User, StoreError>;

    async fn update_user(
        &self,
        user_id: &str,
        update: UserUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;
}
