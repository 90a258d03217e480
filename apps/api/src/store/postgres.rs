use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationUpdate, NewApplication};
use crate::models::fetch_log::{FetchRunLog, SourceFetchLog};
use crate::models::greenhouse::{GreenhouseCompany, NewGreenhouseCompany};
use crate::models::feedback::Feedback;
use crate::models::job::{JobPosting, JobStatus, JobUpdate, NewJobPosting};
use crate::models::resume::{NewResume, Resume, ResumeStatus};
use crate::models::user::{User, UserProfile, UserUpdate};
use crate::store::{InsertOutcome, JobBoardStore, StoreError};

/// `JobBoardStore` backed by PostgreSQL. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobBoardStore for PgStore {
    async fn find_job_by_key(
        &self,
        title: &str,
        company: &str,
        location: &str,
    ) -> Result<Option<JobPosting>, StoreError> {
        Ok(sqlx::query_as::<_, JobPosting>(
            "SELECT * FROM jobs WHERE title = $1 AND company = $2 AND location = $3 LIMIT 1",
        )
        .bind(title)
        .bind(company)
        .bind(location)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_job(
        &self,
        job: NewJobPosting,
        now: DateTime<Utc>,
    ) -> Result<InsertOutcome, StoreError> {
        // The unique index on (title, company, location) turns a racing
        // insert of the same key into an empty RETURNING set.
        let inserted: Option<JobPosting> = sqlx::query_as(
            r#"
            INSERT INTO jobs
                (id, title, company, location, description, status, tag, logo_url,
                 inserting_user_id, posted_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, $10)
            ON CONFLICT (title, company, location) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.description)
        .bind(job.status)
        .bind(job.tag)
        .bind(&job.logo_url)
        .bind(&job.inserting_user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(posting) => Ok(InsertOutcome::Inserted(posting)),
            None => {
                debug!(
                    "Duplicate job skipped at insert: {} / {} / {}",
                    job.title, job.company, job.location
                );
                Ok(InsertOutcome::Duplicate)
            }
        }
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        Ok(
            sqlx::query_as::<_, JobPosting>("SELECT * FROM jobs WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_jobs_by_status(&self, status: JobStatus) -> Result<Vec<JobPosting>, StoreError> {
        Ok(sqlx::query_as::<_, JobPosting>(
            "SELECT * FROM jobs WHERE status = $1 ORDER BY posted_at DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_job(
        &self,
        id: Uuid,
        update: JobUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<JobPosting>, StoreError> {
        Ok(sqlx::query_as::<_, JobPosting>(
            r#"
            UPDATE jobs SET
                title       = COALESCE($2, title),
                company     = COALESCE($3, company),
                location    = COALESCE($4, location),
                description = COALESCE($5, description),
                status      = COALESCE($6, status),
                tag         = COALESCE($7, tag),
                logo_url    = COALESCE($8, logo_url),
                updated_at  = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title)
        .bind(update.company)
        .bind(update.location)
        .bind(update.description)
        .bind(update.status)
        .bind(update.tag)
        .bind(update.logo_url)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_source_log(&self, source: &str) -> Result<Option<SourceFetchLog>, StoreError> {
        Ok(sqlx::query_as::<_, SourceFetchLog>(
            "SELECT * FROM source_fetch_logs WHERE source = $1",
        )
        .bind(source)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn upsert_source_log(
        &self,
        source: &str,
        fetched_at: DateTime<Utc>,
        job_count: i32,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO source_fetch_logs (source, last_fetched_at, job_count)
            VALUES ($1, $2, $3)
            ON CONFLICT (source) DO UPDATE
                SET last_fetched_at = EXCLUDED.last_fetched_at,
                    job_count = EXCLUDED.job_count
            "#,
        )
        .bind(source)
        .bind(fetched_at)
        .bind(job_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_source_logs(&self) -> Result<Vec<SourceFetchLog>, StoreError> {
        Ok(sqlx::query_as::<_, SourceFetchLog>(
            "SELECT * FROM source_fetch_logs ORDER BY source ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_run_log(
        &self,
        inserted_count: i32,
        warnings: &[String],
        at: DateTime<Utc>,
    ) -> Result<FetchRunLog, StoreError> {
        Ok(sqlx::query_as::<_, FetchRunLog>(
            r#"
            INSERT INTO fetch_run_logs (id, inserted_count, warnings, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(inserted_count)
        .bind(warnings)
        .bind(at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_run_logs(&self, limit: i64) -> Result<Vec<FetchRunLog>, StoreError> {
        Ok(sqlx::query_as::<_, FetchRunLog>(
            "SELECT * FROM fetch_run_logs ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_greenhouse_companies(&self) -> Result<Vec<GreenhouseCompany>, StoreError> {
        Ok(sqlx::query_as::<_, GreenhouseCompany>(
            "SELECT * FROM greenhouse_companies ORDER BY added_at ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn add_greenhouse_company(
        &self,
        company: NewGreenhouseCompany,
        now: DateTime<Utc>,
    ) -> Result<GreenhouseCompany, StoreError> {
        Ok(sqlx::query_as::<_, GreenhouseCompany>(
            r#"
            INSERT INTO greenhouse_companies (id, handle, name, url, added_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&company.handle)
        .bind(&company.name)
        .bind(&company.url)
        .bind(now)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn remove_greenhouse_company(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM greenhouse_companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_application(
        &self,
        application: NewApplication,
        now: DateTime<Utc>,
    ) -> Result<Application, StoreError> {
        Ok(sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (id, user_id, job_id, status, notes, saved_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&application.user_id)
        .bind(application.job_id)
        .bind(application.status)
        .bind(&application.notes)
        .bind(now)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_applications_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Application>, StoreError> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE user_id = $1 ORDER BY saved_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<Application>, StoreError> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE job_id = $1 ORDER BY saved_at DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_application(
        &self,
        id: Uuid,
        update: ApplicationUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Application>, StoreError> {
        Ok(sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications SET status = $2, notes = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.status)
        .bind(update.notes)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_application(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_resume(
        &self,
        user_id: &str,
        resume: NewResume,
        now: DateTime<Utc>,
    ) -> Result<Resume, StoreError> {
        Ok(sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes
                (id, user_id, company_name, job_title, job_description, file_storage_id,
                 status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&resume.company_name)
        .bind(&resume.job_title)
        .bind(&resume.job_description)
        .bind(&resume.file_storage_id)
        .bind(ResumeStatus::Active)
        .bind(now)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_resume(&self, id: Uuid) -> Result<Option<Resume>, StoreError> {
        Ok(
            sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_resumes_for_user(
        &self,
        user_id: &str,
        status: ResumeStatus,
    ) -> Result<Vec<Resume>, StoreError> {
        Ok(sqlx::query_as::<_, Resume>(
            r#"
            SELECT * FROM resumes
            WHERE user_id = $1 AND status = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_resume_status(
        &self,
        id: Uuid,
        status: ResumeStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Resume>, StoreError> {
        Ok(sqlx::query_as::<_, Resume>(
            "UPDATE resumes SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_resume_feedback(
        &self,
        id: Uuid,
        feedback: Feedback,
        now: DateTime<Utc>,
    ) -> Result<Option<Resume>, StoreError> {
        Ok(sqlx::query_as::<_, Resume>(
            "UPDATE resumes SET feedback = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(sqlx::types::Json(feedback))
        .bind(now)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_user_if_absent(
        &self,
        user_id: &str,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, name, email, clerk_id, image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.clerk_id)
        .bind(&profile.image)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_user(
        &self,
        user_id: &str,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, name, email, clerk_id, image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (user_id) DO UPDATE
                SET name = EXCLUDED.name,
                    email = EXCLUDED.email,
                    clerk_id = EXCLUDED.clerk_id,
                    image = EXCLUDED.image,
                    updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.clerk_id)
        .bind(&profile.image)
        .bind(now)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_user(
        &self,
        user_id: &str,
        update: UserUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name       = COALESCE($2, name),
                email      = COALESCE($3, email),
                clerk_id   = COALESCE($4, clerk_id),
                image      = COALESCE($5, image),
                updated_at = $6
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(update.name)
        .bind(update.email)
        .bind(update.clerk_id)
        .bind(update.image)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?)
    }
}
