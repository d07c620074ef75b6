use std::future::Future;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::documents::pdf::{extract_text, PdfError};
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::state::AppState;

pub const MAX_RESUME_BYTES: usize = 2 * 1024 * 1024;
pub const PREVIEW_CHARS: usize = 300;
const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: Uuid,
    pub resume_title: Option<String>,
    pub original_file_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<ResumeRow> for ResumeSummary {
    fn from(row: ResumeRow) -> Self {
        Self {
            id: row.id,
            resume_title: row.resume_title,
            original_file_name: row.original_file_name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedResume {
    pub id: Uuid,
    pub resume_title: Option<String>,
    pub original_file_name: String,
    pub extracted_text_preview: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub resume: UploadedResume,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeSummary>,
}

struct ResumeUpload {
    file_name: String,
    bytes: Bytes,
    title: Option<String>,
}

/// POST /api/v1/resumes/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let upload = read_upload(multipart).await?;

    let bytes = upload.bytes.clone();
    let extracted_text = tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| PdfError::Unreadable(e.to_string()))??;

    let resume_id = Uuid::new_v4();
    let s3_key = format!("resumes/{user_id}/{resume_id}.pdf");
    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&s3_key)
        .content_type(PDF_CONTENT_TYPE)
        .body(ByteStream::from(upload.bytes))
        .send()
        .await
        .map_err(|e| AppError::S3(e.to_string()))?;

    let inserted = insert_resume(
        &state.db,
        NewResume {
            id: resume_id,
            user_id,
            resume_title: upload.title,
            original_file_name: upload.file_name,
            extracted_text,
            s3_key: s3_key.clone(),
        },
    )
    .await;
    let row = or_cleanup(inserted, || delete_stored_pdf(&state, &s3_key)).await?;

    info!(%user_id, resume_id = %row.id, chars = row.extracted_text.len(), "resume uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Resume uploaded successfully",
            resume: UploadedResume {
                id: row.id,
                extracted_text_preview: preview(&row.extracted_text),
                resume_title: row.resume_title,
                original_file_name: row.original_file_name,
                created_at: row.created_at,
            },
        }),
    ))
}

/// Runs `cleanup` when `result` is an error, then hands the result back unchanged.
async fn or_cleanup<T, E, F, Fut>(result: Result<T, E>, cleanup: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    if result.is_err() {
        cleanup().await;
    }
    result
}

/// Best-effort removal of an uploaded PDF whose row never made it into the database.
async fn delete_stored_pdf(state: &AppState, s3_key: &str) {
    let deleted = state
        .s3
        .delete_object()
        .bucket(&state.config.s3_bucket)
        .key(s3_key)
        .send()
        .await;
    if let Err(e) = deleted {
        warn!(s3_key, "failed to remove orphaned resume PDF: {e}");
    }
}

/// GET /api/v1/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ResumeListResponse>, AppError> {
    let rows: Vec<ResumeRow> =
        sqlx::query_as("SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&state.db)
            .await?;

    Ok(Json(ResumeListResponse {
        resumes: rows.into_iter().map(ResumeSummary::from).collect(),
    }))
}

async fn read_upload(mut multipart: Multipart) -> Result<ResumeUpload, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut title = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                validate_pdf_metadata(&file_name, &content_type)?;
                let bytes = field.bytes().await.map_err(|_| {
                    AppError::Validation("File exceeds the 2 MB upload limit".to_string())
                })?;
                file = Some((file_name, bytes));
            }
            Some("resumeTitle") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid resumeTitle: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    title = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::Validation("A PDF file is required".to_string()))?;
    validate_pdf_size(bytes.len())?;

    Ok(ResumeUpload {
        file_name,
        bytes,
        title,
    })
}

fn validate_pdf_metadata(file_name: &str, content_type: &str) -> Result<(), AppError> {
    let is_pdf_name = file_name.to_ascii_lowercase().ends_with(".pdf");
    if !is_pdf_name || content_type != PDF_CONTENT_TYPE {
        return Err(AppError::Validation(
            "Only PDF files are allowed".to_string(),
        ));
    }
    Ok(())
}

fn validate_pdf_size(len: usize) -> Result<(), AppError> {
    if len == 0 {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if len > MAX_RESUME_BYTES {
        return Err(AppError::Validation(
            "File exceeds the 2 MB upload limit".to_string(),
        ));
    }
    Ok(())
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

pub struct NewResume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_title: Option<String>,
    pub original_file_name: String,
    pub extracted_text: String,
    pub s3_key: String,
}

pub async fn insert_resume(pool: &PgPool, new: NewResume) -> sqlx::Result<ResumeRow> {
    sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes
            (id, user_id, resume_title, original_file_name, extracted_text, s3_key)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(new.id)
    .bind(new.user_id)
    .bind(new.resume_title)
    .bind(new.original_file_name)
    .bind(new.extracted_text)
    .bind(new.s3_key)
    .fetch_one(pool)
    .await
}

pub async fn find_owned_resume(
    pool: &PgPool,
    user_id: Uuid,
    resume_id: Uuid,
) -> sqlx::Result<Option<ResumeRow>> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_metadata_accepted() {
        assert!(validate_pdf_metadata("CV.PDF", "application/pdf").is_ok());
    }

    #[test]
    fn test_non_pdf_rejected() {
        assert!(validate_pdf_metadata("cv.docx", "application/pdf").is_err());
        assert!(validate_pdf_metadata("cv.pdf", "text/plain").is_err());
        assert!(validate_pdf_metadata("", "").is_err());
    }

    #[test]
    fn test_size_limits() {
        assert!(validate_pdf_size(0).is_err());
        assert!(validate_pdf_size(MAX_RESUME_BYTES).is_ok());
        assert!(validate_pdf_size(MAX_RESUME_BYTES + 1).is_err());
    }

    #[tokio::test]
    async fn test_failed_insert_triggers_cleanup() {
        let cleaned = std::cell::Cell::new(false);
        let result: Result<u8, &str> = or_cleanup(Err("insert failed"), || async {
            cleaned.set(true);
        })
        .await;
        assert_eq!(result, Err("insert failed"));
        assert!(cleaned.get());
    }

    #[tokio::test]
    async fn test_successful_insert_skips_cleanup() {
        let cleaned = std::cell::Cell::new(false);
        let result: Result<u8, &str> = or_cleanup(Ok(7), || async {
            cleaned.set(true);
        })
        .await;
        assert_eq!(result, Ok(7));
        assert!(!cleaned.get());
    }

    #[test]
    fn test_preview_is_char_bounded() {
        let text = "é".repeat(PREVIEW_CHARS + 20);
        assert_eq!(preview(&text).chars().count(), PREVIEW_CHARS);
        assert_eq!(preview("short"), "short");
    }
}
