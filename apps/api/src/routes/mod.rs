pub mod guard;
pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::applications::handlers as applications;
use crate::feedback::handlers as feedback;
use crate::greenhouse::handlers as greenhouse;
use crate::ingest::handlers as ingest;
use crate::jobs::handlers as jobs;
use crate::resumes::handlers as resumes;
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ingestion
        .route("/api/v1/jobs/fetch", get(ingest::handle_fetch_jobs))
        .route("/api/v1/ingest/sources", get(ingest::handle_list_sources))
        .route("/api/v1/ingest/runs", get(ingest::handle_list_runs))
        // Job board
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_open_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job)
                .patch(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route(
            "/api/v1/jobs/:id/applications",
            get(applications::handle_list_job_applications),
        )
        // Application tracker
        .route(
            "/api/v1/applications",
            get(applications::handle_list_user_applications)
                .post(applications::handle_create_application),
        )
        .route(
            "/api/v1/applications/:id",
            patch(applications::handle_update_application)
                .delete(applications::handle_delete_application),
        )
        // Greenhouse boards
        .route(
            "/api/v1/greenhouse/companies",
            get(greenhouse::handle_list_companies).post(greenhouse::handle_add_company),
        )
        .route(
            "/api/v1/greenhouse/companies/:id",
            delete(greenhouse::handle_remove_company),
        )
        // Résumés
        .route(
            "/api/v1/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume).delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/archive",
            post(resumes::handle_archive_resume),
        )
        .route(
            "/api/v1/resumes/:id/feedback",
            put(resumes::handle_update_resume_feedback),
        )
        // Users
        .route("/api/v1/users", post(users::handle_create_user))
        .route(
            "/api/v1/users/me",
            get(users::handle_get_user)
                .put(users::handle_sync_user)
                .patch(users::handle_update_user),
        )
        // Résumé feedback
        .route(
            "/api/v1/feedback/normalize",
            post(feedback::handle_normalize_feedback),
        )
        .with_state(state)
}
