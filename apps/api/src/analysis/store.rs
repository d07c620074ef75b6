//! Analysis persistence. Append-only: rows are inserted once and never updated.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analysis::pipeline::AnalysisResult;
use crate::models::analysis::{AnalysisRow, AnalysisSummaryRow};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Clamps history paging to page ≥ 1 and limit in [1, 50].
pub fn clamp_page(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit)
}

/// Rows to skip for `page`. Saturates instead of overflowing on absurd page numbers;
/// Postgres returns an empty page for an out-of-range OFFSET.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).max(0).saturating_mul(limit)
}

pub struct NewAnalysis<'a> {
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub job_description_id: Uuid,
    pub result: &'a AnalysisResult,
}

pub async fn insert_analysis(pool: &PgPool, new: NewAnalysis<'_>) -> sqlx::Result<AnalysisRow> {
    let NewAnalysis {
        user_id,
        resume_id,
        job_description_id,
        result,
    } = new;

    sqlx::query_as::<_, AnalysisRow>(
        r#"
        INSERT INTO analyses
            (id, user_id, resume_id, job_description_id, ats_score, similarity_score,
             final_score, fit_label, matched_skills, missing_skills, categorized_skills,
             strengths, improvements)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(resume_id)
    .bind(job_description_id)
    .bind(i16::from(result.ats_score))
    .bind(i16::from(result.similarity_score))
    .bind(i16::from(result.final_score))
    .bind(result.fit_label.as_str())
    .bind(&result.matched_skills)
    .bind(&result.missing_skills)
    .bind(Json(&result.categorized_skills))
    .bind(&result.strengths)
    .bind(&result.improvements)
    .fetch_one(pool)
    .await
}

/// Newest first, one page of the caller's analyses.
pub async fn list_analyses(
    pool: &PgPool,
    user_id: Uuid,
    page: i64,
    limit: i64,
) -> sqlx::Result<Vec<AnalysisSummaryRow>> {
    sqlx::query_as::<_, AnalysisSummaryRow>(
        r#"
        SELECT id, resume_id, job_description_id, ats_score, similarity_score,
               final_score, fit_label, created_at
        FROM analyses
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(page_offset(page, limit))
    .fetch_all(pool)
    .await
}

pub async fn count_analyses(pool: &PgPool, user_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM analyses WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// `None` when the analysis does not exist or belongs to someone else.
pub async fn find_owned_analysis(
    pool: &PgPool,
    user_id: Uuid,
    analysis_id: Uuid,
) -> sqlx::Result<Option<AnalysisRow>> {
    sqlx::query_as::<_, AnalysisRow>("SELECT * FROM analyses WHERE id = $1 AND user_id = $2")
        .bind(analysis_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
