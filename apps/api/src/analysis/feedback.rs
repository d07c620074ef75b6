//! Strength / improvement sentences derived from the match buckets.

use serde::{Deserialize, Serialize};

/// How many skills a single feedback sentence lists.
pub const FEEDBACK_LIST_LIMIT: usize = 3;

pub const LIMITED_ALIGNMENT_MESSAGE: &str =
    "Your resume shows limited direct skill alignment with the job description.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

/// Builds feedback in fixed order: strong, partial, missing, then the fallback when
/// nothing matched at all. Each sentence lists the first three entries of its bucket.
pub fn generate_feedback<S: AsRef<str>>(strong: &[S], partial: &[S], missing: &[S]) -> Feedback {
    let mut feedback = Feedback::default();

    if !strong.is_empty() {
        feedback
            .strengths
            .push(format!("Strong experience with {}.", head(strong)));
    }

    if !partial.is_empty() {
        feedback
            .strengths
            .push(format!("Familiarity with {}.", head(partial)));
    }

    if !missing.is_empty() {
        feedback.improvements.push(format!(
            "Consider adding experience with {} if relevant.",
            head(missing)
        ));
    }

    if strong.is_empty() && partial.is_empty() {
        feedback
            .improvements
            .push(LIMITED_ALIGNMENT_MESSAGE.to_string());
    }

    feedback
}

fn head<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .take(FEEDBACK_LIST_LIMIT)
        .map(|item| item.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn test_full_feedback_order() {
        let fb = generate_feedback(&["Python"], &["FastAPI"], &["CI/CD", "MongoDB"]);
        assert_eq!(
            fb.strengths,
            vec!["Strong experience with Python.", "Familiarity with FastAPI."]
        );
        assert_eq!(
            fb.improvements,
            vec!["Consider adding experience with CI/CD, MongoDB if relevant."]
        );
    }

    #[test]
    fn test_lists_are_truncated_to_three_in_given_order() {
        let fb = generate_feedback(&["D", "C", "B", "A"], &NONE, &NONE);
        assert_eq!(fb.strengths, vec!["Strong experience with D, C, B."]);
    }

    #[test]
    fn test_no_match_adds_fallback_after_missing() {
        let fb = generate_feedback(&NONE, &NONE, &["Docker", "Python"]);
        assert!(fb.strengths.is_empty());
        assert_eq!(fb.improvements.len(), 2);
        assert_eq!(fb.improvements[1], LIMITED_ALIGNMENT_MESSAGE);
    }

    #[test]
    fn test_partial_only_suppresses_fallback() {
        let fb = generate_feedback(&NONE, &["Kafka"], &NONE);
        assert_eq!(fb.strengths, vec!["Familiarity with Kafka."]);
        assert!(fb.improvements.is_empty());
    }

    #[test]
    fn test_everything_empty_yields_only_fallback() {
        let fb = generate_feedback(&NONE, &NONE, &NONE);
        assert!(fb.strengths.is_empty());
        assert_eq!(fb.improvements, vec![LIMITED_ALIGNMENT_MESSAGE]);
    }
}
