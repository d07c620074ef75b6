//! Occurrence matcher: buckets job-description skills by how often the résumé mentions them.

use std::collections::{BTreeSet, HashMap};

use crate::analysis::text::normalize;
use crate::analysis::vocabulary::SkillVocabulary;

/// Occurrences at or above this count make a skill a strong match.
pub const STRONG_MATCH_MIN_OCCURRENCES: usize = 2;

/// Partition of the JD skill set. `matched` = strong ++ partial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchBuckets {
    pub strong: Vec<String>,
    pub partial: Vec<String>,
    pub missing: Vec<String>,
}

impl MatchBuckets {
    pub fn matched(&self) -> Vec<String> {
        self.strong.iter().chain(&self.partial).cloned().collect()
    }
}

/// Counts whole-word occurrences of each JD skill in normalized résumé text and buckets
/// them: ≥2 strong, 1 partial, 0 missing. Input order of `jd_skills` is preserved per bucket.
///
/// Résumé mentions come from the same vocabulary-wide scan as extraction, so a token
/// consumed by `node.js` is never counted again for `javascript`.
pub fn bucket_skills(
    normalized_resume: &str,
    jd_skills: &BTreeSet<String>,
    vocabulary: &SkillVocabulary,
) -> MatchBuckets {
    let tokens: Vec<&str> = normalized_resume.split_whitespace().collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for skill in vocabulary.mentions(&tokens) {
        *counts.entry(skill).or_insert(0) += 1;
    }

    let mut buckets = MatchBuckets::default();
    for skill in jd_skills {
        let count = if vocabulary.is_canonical(skill) {
            counts.get(skill.as_str()).copied().unwrap_or(0)
        } else {
            // Outside the vocabulary: match the skill's own normalized tokens.
            let own: Vec<String> = normalize(skill)
                .split_whitespace()
                .map(str::to_owned)
                .collect();
            count_occurrences(&tokens, std::slice::from_ref(&own))
        };
        let bucket = match count {
            0 => &mut buckets.missing,
            n if n >= STRONG_MATCH_MIN_OCCURRENCES => &mut buckets.strong,
            _ => &mut buckets.partial,
        };
        bucket.push(skill.clone());
    }
    buckets
}

/// Non-overlapping token-sequence matches, taking the first (longest) form that fits at
/// each position. Operating on tokens gives word boundaries for free: `sql` never
/// matches inside `mysql`.
pub fn count_occurrences(tokens: &[&str], forms: &[Vec<String>]) -> usize {
    let mut count = 0;
    let mut i = 0;

    while i < tokens.len() {
        let rest = &tokens[i..];
        let hit = forms.iter().find(|form| {
            !form.is_empty()
                && form.len() <= rest.len()
                && form.iter().zip(rest).all(|(f, t)| f.as_str() == *t)
        });
        match hit {
            Some(form) => {
                count += 1;
                i += form.len();
            }
            None => i += 1,
        }
    }
    count
}
