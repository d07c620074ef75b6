use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::categorize::{categorize_display_names, CategorizedSkills};
use crate::analysis::pipeline::{finalize, run_ats_keyword_match};
use crate::analysis::store::{
    clamp_page, count_analyses, find_owned_analysis, insert_analysis, list_analyses, NewAnalysis,
};
use crate::analysis::vocabulary::SkillVocabulary;
use crate::auth::AuthUser;
use crate::documents::job_descriptions::find_owned_job_description;
use crate::documents::resumes::find_owned_resume;
use crate::errors::AppError;
use crate::models::analysis::{AnalysisRow, AnalysisSummaryRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAnalysisRequest {
    pub resume_id: Uuid,
    pub job_description_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub ats_score: i16,
    pub similarity_score: i16,
    pub final_score: i16,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAnalysisView {
    pub analysis_id: Uuid,
    pub scores: Scores,
    pub fit_label: String,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub categorized_skills: CategorizedSkills,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RunAnalysisResponse {
    pub message: &'static str,
    pub analysis: RunAnalysisView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummaryView {
    pub analysis_id: Uuid,
    pub resume_id: Uuid,
    pub job_description_id: Uuid,
    pub ats_score: i16,
    pub similarity_score: i16,
    pub final_score: i16,
    pub fit_label: String,
    pub created_at: DateTime<Utc>,
}

impl From<AnalysisSummaryRow> for AnalysisSummaryView {
    fn from(row: AnalysisSummaryRow) -> Self {
        Self {
            analysis_id: row.id,
            resume_id: row.resume_id,
            job_description_id: row.job_description_id,
            ats_score: row.ats_score,
            similarity_score: row.similarity_score,
            final_score: row.final_score,
            fit_label: row.fit_label,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub analyses: Vec<AnalysisSummaryView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetailView {
    pub analysis_id: Uuid,
    pub resume_id: Uuid,
    pub job_description_id: Uuid,
    pub ats_score: i16,
    pub similarity_score: i16,
    pub final_score: i16,
    pub fit_label: String,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub categorized_skills: CategorizedSkills,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisDetailResponse {
    pub analysis: AnalysisDetailView,
}

/// POST /api/v1/analysis/run
pub async fn handle_run(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<RunAnalysisRequest>,
) -> Result<Json<RunAnalysisResponse>, AppError> {
    let (resume, job_description) = tokio::try_join!(
        find_owned_resume(&state.db, user_id, req.resume_id),
        find_owned_job_description(&state.db, user_id, req.job_description_id),
    )?;
    let resume = resume.ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::NotFound("Job description not found".to_string()))?;

    let report = run_ats_keyword_match(
        &resume.extracted_text,
        &job_description.jd_text,
        &state.vocabulary,
    );
    let similarity = state
        .similarity
        .score(&resume.extracted_text, &job_description.jd_text)
        .await?;
    let result = finalize(report, similarity, state.config.score_weights);

    let row = insert_analysis(
        &state.db,
        NewAnalysis {
            user_id,
            resume_id: resume.id,
            job_description_id: job_description.id,
            result: &result,
        },
    )
    .await?;

    info!(
        %user_id,
        analysis_id = %row.id,
        ats = result.ats_score,
        similarity = result.similarity_score,
        final_score = result.final_score,
        fit = %result.fit_label,
        backend = state.similarity.backend(),
        "analysis completed"
    );

    Ok(Json(RunAnalysisResponse {
        message: "Analysis completed successfully",
        analysis: RunAnalysisView {
            analysis_id: row.id,
            scores: Scores {
                ats_score: row.ats_score,
                similarity_score: row.similarity_score,
                final_score: row.final_score,
            },
            fit_label: row.fit_label,
            matched_skills: row.matched_skills,
            missing_skills: row.missing_skills,
            categorized_skills: result.categorized_skills,
            strengths: row.strengths,
            improvements: row.improvements,
            created_at: row.created_at,
        },
    }))
}

/// GET /api/v1/analysis/history
pub async fn handle_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let (page, limit) = clamp_page(params.page, params.limit);

    let (rows, total) = tokio::try_join!(
        list_analyses(&state.db, user_id, page, limit),
        count_analyses(&state.db, user_id),
    )?;

    Ok(Json(HistoryResponse {
        page,
        limit,
        total,
        analyses: rows.into_iter().map(AnalysisSummaryView::from).collect(),
    }))
}

/// GET /api/v1/analysis/:id
pub async fn handle_get(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisDetailResponse>, AppError> {
    let row = find_owned_analysis(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Analysis not found".to_string()))?;

    Ok(Json(AnalysisDetailResponse {
        analysis: detail_view(row, &state.vocabulary),
    }))
}

fn detail_view(row: AnalysisRow, vocabulary: &SkillVocabulary) -> AnalysisDetailView {
    let categorized_skills = match row.categorized_skills {
        Some(stored) => stored.0,
        None => CategorizedSkills {
            matched: categorize_display_names(&row.matched_skills, vocabulary),
            missing: categorize_display_names(&row.missing_skills, vocabulary),
        },
    };

    AnalysisDetailView {
        analysis_id: row.id,
        resume_id: row.resume_id,
        job_description_id: row.job_description_id,
        ats_score: row.ats_score,
        similarity_score: row.similarity_score,
        final_score: row.final_score,
        fit_label: row.fit_label,
        matched_skills: row.matched_skills,
        missing_skills: row.missing_skills,
        categorized_skills,
        strengths: row.strengths,
        improvements: row.improvements,
        created_at: row.created_at,
    }
}
