pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::auth::handlers as auth;
use crate::documents::resumes::MAX_RESUME_BYTES;
use crate::documents::{job_descriptions, resumes};
use crate::state::AppState;

/// Room for multipart framing around a maximum-size PDF.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts (public)
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        // Documents
        .route(
            "/api/v1/resumes/upload",
            post(resumes::handle_upload)
                .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/api/v1/resumes", get(resumes::handle_list))
        .route(
            "/api/v1/job-descriptions",
            post(job_descriptions::handle_create).get(job_descriptions::handle_list),
        )
        // Analysis
        .route("/api/v1/analysis/run", post(analysis::handle_run))
        .route("/api/v1/analysis/history", get(analysis::handle_history))
        .route("/api/v1/analysis/:id", get(analysis::handle_get))
        .with_state(state)
}
