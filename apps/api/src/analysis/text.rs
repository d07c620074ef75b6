//! Text normalization and job-description skill extraction.

use std::collections::BTreeSet;

use crate::analysis::vocabulary::SkillVocabulary;

/// Lowercases, replaces every character that is not an ASCII letter or digit with a
/// space, collapses whitespace runs and trims. Idempotent.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Canonical skills mentioned in already-normalized text.
///
/// Multi-token forms are matched before their parts, so a mention is credited to one
/// skill only. Stop-words never start a mention. The set is ordered so downstream
/// truncation is stable.
pub fn extract_skills(normalized_text: &str, vocabulary: &SkillVocabulary) -> BTreeSet<String> {
    let tokens: Vec<&str> = normalized_text.split_whitespace().collect();
    vocabulary
        .mentions(&tokens)
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::vocabulary::VocabularyTables;

    #[test]
    fn test_normalize_lowercases_and_strips_punctuation() {
        assert_eq!(
            normalize("  Python, FastAPI & MongoDB!! CI/CD\n\tplus "),
            "python fastapi mongodb ci cd plus"
        );
    }

    #[test]
    fn test_normalize_empty_and_symbol_only_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("--- /// ***"), "");
    }

    #[test]
    fn test_normalize_drops_non_ascii_letters() {
        assert_eq!(normalize("Résumé"), "r sum");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "We need Python and FastAPI experience with MongoDB. CI/CD a plus.",
            "node.js / Node.JS / NODEJS",
            "   ",
            "Ünïcödé — dashes – and “quotes”",
            "C++ C# .NET",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_extract_skills_scenario() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let jd = normalize("We need Python and FastAPI experience with MongoDB. CI/CD a plus.");
        let skills: Vec<String> = extract_skills(&jd, &vocab).into_iter().collect();
        assert_eq!(skills, vec!["ci/cd", "fastapi", "mongodb", "python"]);
    }

    #[test]
    fn test_extract_skills_resolves_aliases_and_dedups() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let jd = normalize("Postgres, postgresql and k8s; Kubernetes again");
        let skills: Vec<String> = extract_skills(&jd, &vocab).into_iter().collect();
        assert_eq!(skills, vec!["kubernetes", "postgresql"]);
    }

    #[test]
    fn test_extract_skills_ignores_stop_words_before_aliasing() {
        let mut tables = VocabularyTables {
            skills: vec!["teamcity".to_string()],
            stop_words: vec!["team".to_string()],
            ..Default::default()
        };
        tables
            .aliases
            .insert("tc".to_string(), "teamcity".to_string());
        let vocab = SkillVocabulary::from_tables(tables).unwrap();

        let skills = extract_skills("team tc", &vocab);
        assert_eq!(skills.len(), 1);
        assert!(skills.contains("teamcity"));
    }

    #[test]
    fn test_node_js_is_not_also_javascript() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let jd = normalize("Backend role: Node.js and PostgreSQL");
        let skills: Vec<String> = extract_skills(&jd, &vocab).into_iter().collect();
        assert_eq!(skills, vec!["node.js", "postgresql"]);
    }

    #[test]
    fn test_standalone_js_still_means_javascript() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let skills = extract_skills(&normalize("Modern JS, plus Node.js"), &vocab);
        assert!(skills.contains("javascript"));
        assert!(skills.contains("node.js"));
    }

    #[test]
    fn test_extract_skills_is_order_independent() {
        let vocab = SkillVocabulary::builtin().unwrap();
        let a = extract_skills("docker python redis", &vocab);
        let b = extract_skills("redis docker python", &vocab);
        assert_eq!(a, b);
    }

    #[test]
    fn test_extract_skills_empty_text() {
        let vocab = SkillVocabulary::builtin().unwrap();
        assert!(extract_skills("", &vocab).is_empty());
    }
}
