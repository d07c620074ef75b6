use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::job_description::JobDescriptionRow;
use crate::state::AppState;

pub const MIN_JD_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobDescriptionRequest {
    #[serde(default)]
    pub jd_text: String,
    pub jd_title: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptionView {
    pub id: Uuid,
    pub jd_text: String,
    pub jd_title: Option<String>,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<JobDescriptionRow> for JobDescriptionView {
    fn from(row: JobDescriptionRow) -> Self {
        Self {
            id: row.id,
            jd_text: row.jd_text,
            jd_title: row.jd_title,
            company_name: row.company_name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobDescriptionResponse {
    pub message: &'static str,
    pub job_description: JobDescriptionView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptionListResponse {
    pub job_descriptions: Vec<JobDescriptionView>,
}

/// POST /api/v1/job-descriptions
pub async fn handle_create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreateJobDescriptionRequest>,
) -> Result<(StatusCode, Json<CreateJobDescriptionResponse>), AppError> {
    let jd_text = validate_jd_text(&req.jd_text)?;

    let row: JobDescriptionRow = sqlx::query_as(
        r#"
        INSERT INTO job_descriptions (id, user_id, jd_text, jd_title, company_name)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(jd_text)
    .bind(non_blank(req.jd_title))
    .bind(non_blank(req.company_name))
    .fetch_one(&state.db)
    .await?;

    info!(%user_id, job_description_id = %row.id, "job description saved");

    Ok((
        StatusCode::CREATED,
        Json(CreateJobDescriptionResponse {
            message: "Job description saved successfully",
            job_description: row.into(),
        }),
    ))
}

/// GET /api/v1/job-descriptions
pub async fn handle_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<JobDescriptionListResponse>, AppError> {
    let rows: Vec<JobDescriptionRow> = sqlx::query_as(
        "SELECT * FROM job_descriptions WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(JobDescriptionListResponse {
        job_descriptions: rows.into_iter().map(JobDescriptionView::from).collect(),
    }))
}

pub async fn find_owned_job_description(
    pool: &PgPool,
    user_id: Uuid,
    job_description_id: Uuid,
) -> sqlx::Result<Option<JobDescriptionRow>> {
    sqlx::query_as::<_, JobDescriptionRow>(
        "SELECT * FROM job_descriptions WHERE id = $1 AND user_id = $2",
    )
    .bind(job_description_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Returns the trimmed text, or the 400 the client should see.
fn validate_jd_text(raw: &str) -> Result<&str, AppError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(AppError::Validation(
            "Job description text is required".to_string(),
        ));
    }
    if text.chars().count() < MIN_JD_CHARS {
        return Err(AppError::Validation(
            "Job description text is too short".to_string(),
        ));
    }
    Ok(text)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_jd_required() {
        let err = validate_jd_text("   \n ").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Job description text is required"));
    }

    #[test]
    fn test_short_jd_rejected() {
        let err = validate_jd_text("Rust developer wanted").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Job description text is too short"));
    }

    #[test]
    fn test_valid_jd_is_trimmed() {
        let jd = format!("  {}  ", "We are hiring a backend engineer with Python. ".repeat(2));
        let text = validate_jd_text(&jd).unwrap();
        assert!(!text.starts_with(' ') && !text.ends_with(' '));
        assert!(text.len() >= MIN_JD_CHARS);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" Acme ".into())), Some("Acme".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
