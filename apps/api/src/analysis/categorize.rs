//! Buckets skills into core / important / nice-to-have tiers for display.
//!
//! Tiers come from the same weight table the ATS score uses, so the two can never drift.

use serde::{Deserialize, Serialize};

use crate::analysis::vocabulary::{SkillTier, SkillVocabulary};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TieredSkills {
    pub core: Vec<String>,
    pub important: Vec<String>,
    pub nice_to_have: Vec<String>,
}

impl TieredSkills {
    fn push(&mut self, tier: SkillTier, skill: String) {
        match tier {
            SkillTier::Core => self.core.push(skill),
            SkillTier::Important => self.important.push(skill),
            SkillTier::NiceToHave => self.nice_to_have.push(skill),
        }
    }

    pub fn len(&self) -> usize {
        self.core.len() + self.important.len() + self.nice_to_have.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Same tiers with every entry passed through `f` (e.g. canonical → display name).
    pub fn map_names(self, mut f: impl FnMut(&str) -> String) -> Self {
        let mut convert = |v: Vec<String>| -> Vec<String> { v.iter().map(|s| f(s)).collect() };
        Self {
            core: convert(self.core),
            important: convert(self.important),
            nice_to_have: convert(self.nice_to_have),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedSkills {
    pub matched: TieredSkills,
    pub missing: TieredSkills,
}

/// Tiers canonical skill tokens by weight: 3 core, 2 important, else nice-to-have.
pub fn categorize<S: AsRef<str>>(skills: &[S], vocabulary: &SkillVocabulary) -> TieredSkills {
    let mut tiers = TieredSkills::default();
    for skill in skills {
        let skill = skill.as_ref();
        tiers.push(vocabulary.tier(skill), skill.to_string());
    }
    tiers
}

/// Tiers already-rendered display names, keeping the strings as given.
/// Used for stored analyses that predate categorized output.
pub fn categorize_display_names<S: AsRef<str>>(
    display_names: &[S],
    vocabulary: &SkillVocabulary,
) -> TieredSkills {
    let mut tiers = TieredSkills::default();
    for display in display_names {
        let display = display.as_ref();
        let canonical = vocabulary.canonical_from_display(display);
        tiers.push(vocabulary.tier(&canonical), display.to_string());
    }
    tiers
}
