//! ATS score, final-score blend and fit label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::vocabulary::SkillVocabulary;

pub const HIGH_FIT_MIN_SCORE: u8 = 75;
pub const MEDIUM_FIT_MIN_SCORE: u8 = 50;

/// Blend weights for the final score. Loaded from config; never re-derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub ats: f64,
    pub similarity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            ats: 0.4,
            similarity: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitLabel {
    #[serde(rename = "High Fit")]
    High,
    #[serde(rename = "Medium Fit")]
    Medium,
    #[serde(rename = "Low Fit")]
    Low,
}

impl FitLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitLabel::High => "High Fit",
            FitLabel::Medium => "Medium Fit",
            FitLabel::Low => "Low Fit",
        }
    }
}

impl fmt::Display for FitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High Fit" => Ok(FitLabel::High),
            "Medium Fit" => Ok(FitLabel::Medium),
            "Low Fit" => Ok(FitLabel::Low),
            other => Err(format!("unknown fit label '{other}'")),
        }
    }
}

/// Weighted share of JD skill importance found in the résumé, 0–100, half-up rounding.
/// 0 when there is nothing to weigh.
pub fn calculate_ats_score<S: AsRef<str>>(
    matched: &[S],
    missing: &[S],
    vocabulary: &SkillVocabulary,
) -> u8 {
    let weigh = |skills: &[S]| -> u32 {
        skills
            .iter()
            .map(|s| u32::from(vocabulary.weight(s.as_ref())))
            .sum()
    };

    let matched_weight = weigh(matched);
    let total_weight = matched_weight + weigh(missing);
    if total_weight == 0 {
        return 0;
    }
    to_percentage(100.0 * f64::from(matched_weight) / f64::from(total_weight))
}

/// `weights.ats * ats + weights.similarity * similarity`, inputs and output clamped to 0–100.
pub fn compute_final_score(ats_score: i32, similarity_score: i32, weights: ScoreWeights) -> u8 {
    let ats = f64::from(ats_score.clamp(0, 100));
    let similarity = f64::from(similarity_score.clamp(0, 100));
    to_percentage(weights.ats * ats + weights.similarity * similarity)
}

pub fn get_fit_label(final_score: u8) -> FitLabel {
    if final_score >= HIGH_FIT_MIN_SCORE {
        FitLabel::High
    } else if final_score >= MEDIUM_FIT_MIN_SCORE {
        FitLabel::Medium
    } else {
        FitLabel::Low
    }
}

/// Clamps to 0–100 and rounds half-up. NaN maps to 0.
pub fn to_percentage(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ats_score_scenario() {
        let vocab = SkillVocabulary::builtin().unwrap();
        // matched: python(3) + fastapi(3); missing: mongodb(2) + ci/cd(1) → 600/9
        let score = calculate_ats_score(&["python", "fastapi"], &["mongodb", "ci/cd"], &vocab);
        assert_eq!(score, 67);
    }

    #[test]
    fn test_ats_score_empty_is_zero() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let empty: [&str; 0] = [];
        assert_eq!(calculate_ats_score(&empty, &empty, &vocab), 0);
    }

    #[test]
    fn test_ats_score_bounds() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let none: [&str; 0] = [];
        assert_eq!(calculate_ats_score(&["python", "kafka"], &none, &vocab), 100);
        assert_eq!(calculate_ats_score(&none, &["python", "kafka"], &vocab), 0);
    }

    #[test]
    fn test_ats_score_rounds_half_up() {
        let vocab = SkillVocabulary::builtin().unwrap();
        // 1 of 8 unit-weight skills → 12.5 → 13
        let missing = ["kafka", "redis", "jwt", "oauth", "git", "linux", "gcp"];
        assert_eq!(calculate_ats_score(&["graphql"], &missing, &vocab), 13);
    }

    #[test]
    fn test_final_score_scenarios() {
        let w = ScoreWeights::default();
        assert_eq!(compute_final_score(80, 60, w), 68);
        assert_eq!(compute_final_score(100, 100, w), 100);
        assert_eq!(compute_final_score(0, 0, w), 0);
    }

    #[test]
    fn test_final_score_clamps_inputs() {
        let w = ScoreWeights::default();
        assert_eq!(compute_final_score(250, -40, w), 40);
        assert_eq!(compute_final_score(-1, 1000, w), 60);
    }

    #[test]
    fn test_final_score_monotonic_in_similarity() {
        let w = ScoreWeights::default();
        for ats in [0, 33, 67, 100] {
            let mut previous = 0;
            for similarity in 0..=100 {
                let score = compute_final_score(ats, similarity, w);
                assert!(score >= previous, "ats={ats} similarity={similarity}");
                previous = score;
            }
        }
    }

    #[test]
    fn test_fit_label_boundaries() {
        assert_eq!(get_fit_label(0), FitLabel::Low);
        assert_eq!(get_fit_label(49), FitLabel::Low);
        assert_eq!(get_fit_label(50), FitLabel::Medium);
        assert_eq!(get_fit_label(74), FitLabel::Medium);
        assert_eq!(get_fit_label(75), FitLabel::High);
        assert_eq!(get_fit_label(100), FitLabel::High);
    }

    #[test]
    fn test_fit_label_scenarios() {
        let w = ScoreWeights::default();
        assert_eq!(get_fit_label(compute_final_score(80, 60, w)), FitLabel::Medium);
        assert_eq!(get_fit_label(compute_final_score(100, 100, w)), FitLabel::High);
        assert_eq!(get_fit_label(compute_final_score(0, 0, w)), FitLabel::Low);
    }

    #[test]
    fn test_fit_label_serde_uses_display_strings() {
        assert_eq!(serde_json::to_string(&FitLabel::High).unwrap(), r#""High Fit""#);
        let label: FitLabel = serde_json::from_str(r#""Low Fit""#).unwrap();
        assert_eq!(label, FitLabel::Low);
    }

    #[test]
    fn test_fit_label_parses_from_stored_text() {
        for label in [FitLabel::High, FitLabel::Medium, FitLabel::Low] {
            assert_eq!(label.as_str().parse::<FitLabel>().unwrap(), label);
        }
        assert!("Great Fit".parse::<FitLabel>().is_err());
    }

    #[test]
    fn test_to_percentage_handles_nan() {
        assert_eq!(to_percentage(f64::NAN), 0);
        assert_eq!(to_percentage(99.5), 100);
    }
}
