//! ATS keyword pipeline.
//!
//! Flow: normalize → extract JD skills → bucket against résumé → ATS score →
//!       feedback → dedup + sort → categorize (canonical tokens) → display names.
//!
//! Pure and synchronous. The similarity score is joined afterwards by `finalize`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::categorize::{categorize, CategorizedSkills};
use crate::analysis::feedback::generate_feedback;
use crate::analysis::matcher::bucket_skills;
use crate::analysis::scoring::{
    calculate_ats_score, compute_final_score, get_fit_label, FitLabel, ScoreWeights,
};
use crate::analysis::text::{extract_skills, normalize};
use crate::analysis::vocabulary::SkillVocabulary;

/// Everything the keyword pipeline knows; no similarity, final score or label yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMatchReport {
    pub ats_score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub categorized_skills: CategorizedSkills,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

/// Full analysis value handed to persistence and the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub ats_score: u8,
    pub similarity_score: u8,
    pub final_score: u8,
    pub fit_label: FitLabel,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub categorized_skills: CategorizedSkills,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

pub fn run_ats_keyword_match(
    resume_text: &str,
    jd_text: &str,
    vocabulary: &SkillVocabulary,
) -> KeywordMatchReport {
    let resume_clean = normalize(resume_text);
    let jd_clean = normalize(jd_text);

    let jd_skills = extract_skills(&jd_clean, vocabulary);
    let buckets = bucket_skills(&resume_clean, &jd_skills, vocabulary);

    let matched = buckets.matched();
    let ats_score = calculate_ats_score(&matched, &buckets.missing, vocabulary);

    let feedback = generate_feedback(&buckets.strong, &buckets.partial, &buckets.missing);

    let matched_sorted = dedup_sorted(&matched);
    let missing_sorted = dedup_sorted(&buckets.missing);

    let display = |skills: &[String]| -> Vec<String> {
        skills.iter().map(|s| vocabulary.display_name(s)).collect()
    };
    let categorized_skills = CategorizedSkills {
        matched: categorize(&matched_sorted, vocabulary).map_names(|s| vocabulary.display_name(s)),
        missing: categorize(&missing_sorted, vocabulary).map_names(|s| vocabulary.display_name(s)),
    };

    debug!(
        jd_skills = jd_skills.len(),
        strong = buckets.strong.len(),
        partial = buckets.partial.len(),
        missing = buckets.missing.len(),
        ats_score,
        "keyword match complete"
    );

    KeywordMatchReport {
        ats_score,
        matched_skills: display(&matched_sorted),
        missing_skills: display(&missing_sorted),
        categorized_skills,
        strengths: feedback.strengths,
        improvements: feedback.improvements,
    }
}

/// Joins the keyword report with the external similarity score.
pub fn finalize(
    report: KeywordMatchReport,
    similarity_score: u8,
    weights: ScoreWeights,
) -> AnalysisResult {
    let similarity_score = similarity_score.min(100);
    let final_score = compute_final_score(
        i32::from(report.ats_score),
        i32::from(similarity_score),
        weights,
    );

    AnalysisResult {
        ats_score: report.ats_score,
        similarity_score,
        final_score,
        fit_label: get_fit_label(final_score),
        matched_skills: report.matched_skills,
        missing_skills: report.missing_skills,
        categorized_skills: report.categorized_skills,
        strengths: report.strengths,
        improvements: report.improvements,
    }
}

fn dedup_sorted(skills: &[String]) -> Vec<String> {
    skills
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::feedback::LIMITED_ALIGNMENT_MESSAGE;
    use crate::analysis::vocabulary::VocabularyTables;

    const SCENARIO_JD: &str = "We need Python and FastAPI experience with MongoDB. CI/CD a plus.";
    const SCENARIO_RESUME: &str = r#"
        Backend engineer. Python since 2016; wrote Python services and Python tooling.
        Shipped one FastAPI microservice.
    "#;

    #[test]
    fn test_scenario_end_to_end() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let report = run_ats_keyword_match(SCENARIO_RESUME, SCENARIO_JD, &vocab);

        assert_eq!(report.ats_score, 67);
        assert_eq!(report.matched_skills, vec!["FastAPI", "Python"]);
        assert_eq!(report.missing_skills, vec!["CI/CD", "MongoDB"]);
        assert_eq!(
            report.strengths,
            vec!["Strong experience with python.", "Familiarity with fastapi."]
        );
        assert_eq!(
            report.improvements,
            vec!["Consider adding experience with ci/cd, mongodb if relevant."]
        );

        let cat = &report.categorized_skills;
        assert_eq!(cat.matched.core, vec!["FastAPI", "Python"]);
        assert!(cat.matched.important.is_empty());
        assert_eq!(cat.missing.important, vec!["MongoDB"]);
        assert_eq!(cat.missing.nice_to_have, vec!["CI/CD"]);
    }

    #[test]
    fn test_node_js_job_does_not_require_javascript() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let report =
            run_ats_keyword_match("Built services in Node.js", "Backend role: Node.js", &vocab);

        assert_eq!(report.matched_skills, vec!["Node.js"]);
        assert!(report.missing_skills.is_empty());
        assert_eq!(report.strengths, vec!["Familiarity with node.js."]);
        assert_eq!(report.ats_score, 100);
    }

    #[test]
    fn test_empty_resume_degrades_gracefully() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let report = run_ats_keyword_match("", "Looking for Docker and Kubernetes skills", &vocab);

        assert_eq!(report.ats_score, 0);
        assert!(report.matched_skills.is_empty());
        assert_eq!(report.missing_skills, vec!["Docker", "Kubernetes"]);
        assert!(report.strengths.is_empty());
        assert!(report.improvements.contains(&LIMITED_ALIGNMENT_MESSAGE.to_string()));
    }

    #[test]
    fn test_both_texts_empty() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let report = run_ats_keyword_match("", "", &vocab);
        assert_eq!(report.ats_score, 0);
        assert!(report.categorized_skills.matched.is_empty());
        assert!(report.categorized_skills.missing.is_empty());
        assert_eq!(report.improvements, vec![LIMITED_ALIGNMENT_MESSAGE]);
    }

    #[test]
    fn test_categorization_covers_every_output_skill() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let report = run_ats_keyword_match(
            "AWS, AWS, Docker, Kafka, Java",
            "Java, AWS, Docker, Kafka, Redis, GraphQL, Rust and Terraform",
            &vocab,
        );
        assert_eq!(
            report.categorized_skills.matched.len(),
            report.matched_skills.len()
        );
        assert_eq!(
            report.categorized_skills.missing.len(),
            report.missing_skills.len()
        );
    }

    #[test]
    fn test_substituted_vocabulary() {
        let mut tables = VocabularyTables {
            skills: vec!["tokio".to_string(), "axum".to_string()],
            ..Default::default()
        };
        tables.weights.insert("tokio".to_string(), 3);
        let vocab = SkillVocabulary::from_tables(tables).unwrap();

        let report = run_ats_keyword_match("tokio tokio", "axum on tokio", &vocab);
        // tokio(3) matched, axum(1) missing → 75
        assert_eq!(report.ats_score, 75);
        assert_eq!(report.matched_skills, vec!["TOKIO"]);
        assert_eq!(report.missing_skills, vec!["AXUM"]);
    }

    #[test]
    fn test_finalize_scenario() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let report = run_ats_keyword_match(SCENARIO_RESUME, SCENARIO_JD, &vocab);
        let result = finalize(report, 60, ScoreWeights::default());

        // 0.4 * 67 + 0.6 * 60 = 62.8
        assert_eq!(result.similarity_score, 60);
        assert_eq!(result.final_score, 63);
        assert_eq!(result.fit_label, FitLabel::Medium);
    }

    #[test]
    fn test_finalize_clamps_similarity() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let report = run_ats_keyword_match("", "", &vocab);
        let result = finalize(report, 250, ScoreWeights::default());
        assert_eq!(result.similarity_score, 100);
        assert_eq!(result.final_score, 60);
    }

    #[test]
    fn test_result_serializes_with_compatible_field_names() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let report = run_ats_keyword_match(SCENARIO_RESUME, SCENARIO_JD, &vocab);
        let json = serde_json::to_value(finalize(report, 80, ScoreWeights::default())).unwrap();

        for field in [
            "atsScore",
            "similarityScore",
            "finalScore",
            "fitLabel",
            "matchedSkills",
            "missingSkills",
            "categorizedSkills",
            "strengths",
            "improvements",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert!(json["categorizedSkills"]["matched"]["niceToHave"].is_array());
    }
}
