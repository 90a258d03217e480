//! In-process `JobBoardStore` used by the test suites.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::application::{Application, ApplicationUpdate, NewApplication};
use crate::models::fetch_log::{FetchRunLog, SourceFetchLog};
use crate::models::greenhouse::{GreenhouseCompany, NewGreenhouseCompany};
use crate::models::feedback::Feedback;
use crate::models::job::{JobPosting, JobStatus, JobUpdate, NewJobPosting};
use crate::models::resume::{NewResume, Resume, ResumeStatus};
use crate::models::user::{User, UserProfile, UserUpdate};
use crate::store::{InsertOutcome, JobBoardStore, StoreError};

/// The exact, case-sensitive `(title, company, location)` key.
fn dedup_key(job: &JobPosting) -> (&str, &str, &str) {
    (&job.title, &job.company, &job.location)
}

#[derive(Default)]
struct Tables {
    jobs: Vec<JobPosting>,
    source_logs: BTreeMap<String, SourceFetchLog>,
    run_logs: Vec<FetchRunLog>,
    companies: Vec<GreenhouseCompany>,
    applications: Vec<Application>,
    resumes: Vec<Resume>,
    users: BTreeMap<String, User>,
    source_upserts: Vec<String>,
    writes: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// Yield to the scheduler before every operation so concurrent callers interleave.
    interleave: bool,
    failing_titles: HashSet<String>,
    fail_run_log: bool,
    /// Hold each `insert_job` open across a yield and record how many overlap.
    track_inserts: bool,
    inserts_in_flight: AtomicUsize,
    peak_inserts_in_flight: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interleaved() -> Self {
        Self {
            interleave: true,
            ..Self::default()
        }
    }

    /// Inserts of a posting with this title fail with `StoreError::Unavailable`.
    pub fn failing_insert_for(mut self, title: &str) -> Self {
        self.failing_titles.insert(title.to_string());
        self
    }

    pub fn tracking_inserts() -> Self {
        Self {
            track_inserts: true,
            ..Self::default()
        }
    }

    /// Most `insert_job` calls seen in flight at once.
    pub fn peak_inserts_in_flight(&self) -> usize {
        self.peak_inserts_in_flight.load(Ordering::SeqCst)
    }

    pub fn failing_run_log(mut self) -> Self {
        self.fail_run_log = true;
        self
    }

    pub fn jobs(&self) -> Vec<JobPosting> {
        self.tables.lock().unwrap().jobs.clone()
    }

    pub fn resumes(&self) -> Vec<Resume> {
        self.tables.lock().unwrap().resumes.clone()
    }

    pub fn run_logs(&self) -> Vec<FetchRunLog> {
        self.tables.lock().unwrap().run_logs.clone()
    }

    /// Source names in upsert order, one entry per upsert call.
    pub fn source_upserts(&self) -> Vec<String> {
        self.tables.lock().unwrap().source_upserts.clone()
    }

    pub fn write_count(&self) -> usize {
        self.tables.lock().unwrap().writes
    }

    pub fn seed_source_log(&self, source: &str, last_fetched_at: DateTime<Utc>) {
        self.tables.lock().unwrap().source_logs.insert(
            source.to_string(),
            SourceFetchLog {
                source: source.to_string(),
                last_fetched_at,
                job_count: 0,
            },
        );
    }

    pub fn seed_company(&self, handle: &str, name: &str) {
        self.tables.lock().unwrap().companies.push(GreenhouseCompany {
            id: Uuid::new_v4(),
            handle: handle.to_string(),
            name: name.to_string(),
            url: None,
            added_at: Utc::now(),
        });
    }

    async fn pause(&self) {
        if self.interleave {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl JobBoardStore for MemoryStore {
    async fn find_job_by_key(
        &self,
        title: &str,
        company: &str,
        location: &str,
    ) -> Result<Option<JobPosting>, StoreError> {
        self.pause().await;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .jobs
            .iter()
            .find(|j| dedup_key(j) == (title, company, location))
            .cloned())
    }

    async fn insert_job(
        &self,
        job: NewJobPosting,
        now: DateTime<Utc>,
    ) -> Result<InsertOutcome, StoreError> {
        self.pause().await;
        if self.track_inserts {
            let now_in_flight = self.inserts_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_inserts_in_flight
                .fetch_max(now_in_flight, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.inserts_in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        if self.failing_titles.contains(&job.title) {
            return Err(StoreError::Unavailable("insert rejected".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        let key = (job.title.as_str(), job.company.as_str(), job.location.as_str());
        if tables.jobs.iter().any(|j| dedup_key(j) == key) {
            return Ok(InsertOutcome::Duplicate);
        }
        let posting = JobPosting {
            id: Uuid::new_v4(),
            title: job.title,
            company: job.company,
            location: job.location,
            description: job.description,
            status: job.status,
            tag: job.tag,
            logo_url: job.logo_url,
            inserting_user_id: job.inserting_user_id,
            posted_at: now,
            created_at: now,
            updated_at: now,
        };
        tables.jobs.push(posting.clone());
        tables.writes += 1;
        Ok(InsertOutcome::Inserted(posting))
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn list_jobs_by_status(&self, status: JobStatus) -> Result<Vec<JobPosting>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .jobs
            .iter()
            .filter(|j| j.status == status)
            .cloned()
            .collect())
    }

    async fn update_job(
        &self,
        id: Uuid,
        update: JobUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<JobPosting>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(index) = tables.jobs.iter().position(|j| j.id == id) else {
            return Ok(None);
        };
        let mut updated = tables.jobs[index].clone();
        update.apply(&mut updated);
        let clash = tables
            .jobs
            .iter()
            .any(|j| j.id != id && dedup_key(j) == dedup_key(&updated));
        if clash {
            return Err(StoreError::Conflict(
                "a posting with this title, company and location exists".to_string(),
            ));
        }
        updated.updated_at = now;
        tables.jobs[index] = updated.clone();
        tables.writes += 1;
        Ok(Some(updated))
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.jobs.len();
        tables.jobs.retain(|j| j.id != id);
        tables.applications.retain(|a| a.job_id != id);
        tables.writes += 1;
        Ok(tables.jobs.len() < before)
    }

    async fn get_source_log(&self, source: &str) -> Result<Option<SourceFetchLog>, StoreError> {
        self.pause().await;
        Ok(self.tables.lock().unwrap().source_logs.get(source).cloned())
    }

    async fn upsert_source_log(
        &self,
        source: &str,
        fetched_at: DateTime<Utc>,
        job_count: i32,
    ) -> Result<(), StoreError> {
        self.pause().await;
        let mut tables = self.tables.lock().unwrap();
        tables.source_logs.insert(
            source.to_string(),
            SourceFetchLog {
                source: source.to_string(),
                last_fetched_at: fetched_at,
                job_count,
            },
        );
        tables.source_upserts.push(source.to_string());
        tables.writes += 1;
        Ok(())
    }

    async fn list_source_logs(&self) -> Result<Vec<SourceFetchLog>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .source_logs
            .values()
            .cloned()
            .collect())
    }

    async fn insert_run_log(
        &self,
        inserted_count: i32,
        warnings: &[String],
        at: DateTime<Utc>,
    ) -> Result<FetchRunLog, StoreError> {
        if self.fail_run_log {
            return Err(StoreError::Unavailable("run log rejected".to_string()));
        }
        let log = FetchRunLog {
            id: Uuid::new_v4(),
            inserted_count,
            warnings: warnings.to_vec(),
            created_at: at,
        };
        let mut tables = self.tables.lock().unwrap();
        tables.run_logs.push(log.clone());
        tables.writes += 1;
        Ok(log)
    }

    async fn list_run_logs(&self, limit: i64) -> Result<Vec<FetchRunLog>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut logs = tables.run_logs.clone();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        logs.truncate(limit.max(0) as usize);
        Ok(logs)
    }

    async fn list_greenhouse_companies(&self) -> Result<Vec<GreenhouseCompany>, StoreError> {
        self.pause().await;
        Ok(self.tables.lock().unwrap().companies.clone())
    }

    async fn add_greenhouse_company(
        &self,
        company: NewGreenhouseCompany,
        now: DateTime<Utc>,
    ) -> Result<GreenhouseCompany, StoreError> {
        let company = GreenhouseCompany {
            id: Uuid::new_v4(),
            handle: company.handle,
            name: company.name,
            url: company.url,
            added_at: now,
        };
        let mut tables = self.tables.lock().unwrap();
        if tables.companies.iter().any(|c| c.handle == company.handle) {
            return Err(StoreError::Conflict(format!(
                "greenhouse board '{}' already exists",
                company.handle
            )));
        }
        tables.companies.push(company.clone());
        tables.writes += 1;
        Ok(company)
    }

    async fn remove_greenhouse_company(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.companies.len();
        tables.companies.retain(|c| c.id != id);
        tables.writes += 1;
        Ok(tables.companies.len() < before)
    }

    async fn create_application(
        &self,
        application: NewApplication,
        now: DateTime<Utc>,
    ) -> Result<Application, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.jobs.iter().any(|j| j.id == application.job_id) {
            return Err(StoreError::NotFound(format!(
                "Job {} not found",
                application.job_id
            )));
        }
        let created = Application {
            id: Uuid::new_v4(),
            user_id: application.user_id,
            job_id: application.job_id,
            status: application.status,
            notes: application.notes,
            saved_at: now,
            updated_at: now,
        };
        tables.applications.push(created.clone());
        tables.writes += 1;
        Ok(created)
    }

    async fn list_applications_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Application>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<Application>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn update_application(
        &self,
        id: Uuid,
        update: ApplicationUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Application>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(application) = tables.applications.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        application.status = update.status;
        application.notes = update.notes;
        application.updated_at = now;
        let updated = application.clone();
        tables.writes += 1;
        Ok(Some(updated))
    }

    async fn delete_application(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.applications.len();
        tables.applications.retain(|a| a.id != id);
        tables.writes += 1;
        Ok(tables.applications.len() < before)
    }

    async fn create_resume(
        &self,
        user_id: &str,
        resume: NewResume,
        now: DateTime<Utc>,
    ) -> Result<Resume, StoreError> {
        let created = Resume {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            company_name: resume.company_name,
            job_title: resume.job_title,
            job_description: resume.job_description,
            file_storage_id: resume.file_storage_id,
            feedback: None,
            status: ResumeStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.tables.lock().unwrap();
        tables.resumes.push(created.clone());
        tables.writes += 1;
        Ok(created)
    }

    async fn get_resume(&self, id: Uuid) -> Result<Option<Resume>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.resumes.iter().find(|r| r.id == id).cloned())
    }

    async fn list_resumes_for_user(
        &self,
        user_id: &str,
        status: ResumeStatus,
    ) -> Result<Vec<Resume>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut resumes: Vec<Resume> = tables
            .resumes
            .iter()
            .filter(|r| r.user_id == user_id && r.status == status)
            .cloned()
            .collect();
        resumes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(resumes)
    }

    async fn set_resume_status(
        &self,
        id: Uuid,
        status: ResumeStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Resume>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(resume) = tables.resumes.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        resume.status = status;
        resume.updated_at = now;
        let updated = resume.clone();
        tables.writes += 1;
        Ok(Some(updated))
    }

    async fn set_resume_feedback(
        &self,
        id: Uuid,
        feedback: Feedback,
        now: DateTime<Utc>,
    ) -> Result<Option<Resume>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(resume) = tables.resumes.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        resume.feedback = Some(sqlx::types::Json(feedback));
        resume.updated_at = now;
        let updated = resume.clone();
        tables.writes += 1;
        Ok(Some(updated))
    }

    async fn insert_user_if_absent(
        &self,
        user_id: &str,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.contains_key(user_id) {
            return Ok(None);
        }
        let user = new_user(user_id, profile, now);
        tables.users.insert(user_id.to_string(), user.clone());
        tables.writes += 1;
        Ok(Some(user))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.tables.lock().unwrap().users.get(user_id).cloned())
    }

    async fn upsert_user(
        &self,
        user_id: &str,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let user = match tables.users.get(user_id) {
            Some(existing) => User {
                name: profile.name,
                email: profile.email,
                clerk_id: profile.clerk_id,
                image: profile.image,
                updated_at: now,
                ..existing.clone()
            },
            None => new_user(user_id, profile, now),
        };
        tables.users.insert(user_id.to_string(), user.clone());
        tables.writes += 1;
        Ok(user)
    }

    async fn update_user(
        &self,
        user_id: &str,
        update: UserUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(user) = tables.users.get_mut(user_id) else {
            return Ok(None);
        };
        update.apply(user);
        user.updated_at = now;
        let updated = user.clone();
        tables.writes += 1;
        Ok(Some(updated))
    }
}

fn new_user(user_id: &str, profile: UserProfile, now: DateTime<Utc>) -> User {
    User {
        user_id: user_id.to_string(),
        name: profile.name,
        email: profile.email,
        clerk_id: profile.clerk_id,
        image: profile.image,
        created_at: now,
        updated_at: now,
    }
}
