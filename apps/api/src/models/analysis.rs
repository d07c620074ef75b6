use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::categorize::CategorizedSkills;

/// A persisted analysis. Insert-only: rows are never updated after creation.
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub job_description_id: Uuid,
    pub ats_score: i16,
    pub similarity_score: i16,
    pub final_score: i16,
    pub fit_label: String,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// NULL for rows written before categorized output existed.
    pub categorized_skills: Option<Json<CategorizedSkills>>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Lightweight projection used by the history listing.
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisSummaryRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub job_description_id: Uuid,
    pub ats_score: i16,
    pub similarity_score: i16,
    pub final_score: i16,
    pub fit_label: String,
    pub created_at: DateTime<Utc>,
}
