//! Skill vocabulary: canonical skills, stop-words, aliases, display names and weights.
//!
//! Built once at startup and shared read-only through `AppState` as an
//! `Arc<SkillVocabulary>`. Nothing here is process-global: tests build their own
//! vocabulary with `SkillVocabulary::from_tables`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::analysis::text::normalize;

/// Weight used for any canonical skill without an explicit entry.
pub const DEFAULT_SKILL_WEIGHT: u8 = 1;

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid vocabulary JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("skill '{0}' has no letters or digits")]
    EmptySkill(String),

    #[error("'{0}' is listed both as a skill and as a stop-word")]
    StopWordSkill(String),

    #[error("alias '{0}' must be a single lowercase alphanumeric token")]
    InvalidAlias(String),

    #[error("alias '{0}' shadows a canonical skill of the same name")]
    AliasShadowsSkill(String),

    #[error("alias '{alias}' points at unknown skill '{target}'")]
    UnknownAliasTarget { alias: String, target: String },

    #[error("'{0}' has a weight or display name but is not a canonical skill")]
    UnknownSkill(String),

    #[error("weight for '{skill}' must be 1, 2 or 3 (got {weight})")]
    InvalidWeight { skill: String, weight: u8 },

    #[error("display name '{display}' does not lowercase back to '{skill}'")]
    DisplayMismatch { skill: String, display: String },
}

/// Importance tier of a skill, derived from its weight (3 → core, 2 → important, else nice-to-have).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillTier {
    Core,
    Important,
    NiceToHave,
}

impl SkillTier {
    pub fn from_weight(weight: u8) -> Self {
        match weight {
            3 => SkillTier::Core,
            2 => SkillTier::Important,
            _ => SkillTier::NiceToHave,
        }
    }
}

/// Raw vocabulary tables as they appear in a JSON override file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VocabularyTables {
    pub skills: Vec<String>,
    pub stop_words: Vec<String>,
    /// alias token → canonical skill
    pub aliases: BTreeMap<String, String>,
    /// canonical skill → display string
    pub display_names: BTreeMap<String, String>,
    /// canonical skill → weight in 1..=3
    pub weights: BTreeMap<String, u8>,
}

/// Validated, read-only skill vocabulary.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    skills: HashSet<String>,
    stop_words: HashSet<String>,
    aliases: HashMap<String, String>,
    display_names: HashMap<String, String>,
    weights: HashMap<String, u8>,
    /// first token → (token sequence, canonical skill), longest sequence first
    forms_by_first_token: HashMap<String, Vec<(Vec<String>, String)>>,
}

impl SkillVocabulary {
    /// The vocabulary shipped with the service.
    pub fn builtin() -> Result<Self, VocabularyError> {
        Self::from_tables(builtin_tables())
    }

    /// Reads a JSON `VocabularyTables` document and validates it.
    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let raw = std::fs::read_to_string(path)?;
        let tables: VocabularyTables = serde_json::from_str(&raw)?;
        let vocabulary = Self::from_tables(tables)?;
        info!(
            "Loaded skill vocabulary from {} ({} skills)",
            path.display(),
            vocabulary.skill_count()
        );
        Ok(vocabulary)
    }

    pub fn from_tables(tables: VocabularyTables) -> Result<Self, VocabularyError> {
        let skills: HashSet<String> = tables.skills.iter().map(|s| key(s)).collect();
        let stop_words: HashSet<String> = tables.stop_words.iter().map(|s| key(s)).collect();

        for skill in &skills {
            if normalize(skill).is_empty() {
                return Err(VocabularyError::EmptySkill(skill.clone()));
            }
            if stop_words.contains(skill) {
                return Err(VocabularyError::StopWordSkill(skill.clone()));
            }
        }

        let mut aliases = HashMap::with_capacity(tables.aliases.len());
        for (alias, target) in &tables.aliases {
            let (alias, target) = (key(alias), key(target));
            if alias.is_empty() || normalize(&alias) != alias || alias.contains(' ') {
                return Err(VocabularyError::InvalidAlias(alias));
            }
            if skills.contains(&alias) {
                return Err(VocabularyError::AliasShadowsSkill(alias));
            }
            if !skills.contains(&target) {
                return Err(VocabularyError::UnknownAliasTarget { alias, target });
            }
            aliases.insert(alias, target);
        }

        let mut weights = HashMap::with_capacity(tables.weights.len());
        for (skill, weight) in &tables.weights {
            let skill = key(skill);
            if !skills.contains(&skill) {
                return Err(VocabularyError::UnknownSkill(skill));
            }
            if !(1..=3).contains(weight) {
                return Err(VocabularyError::InvalidWeight {
                    skill,
                    weight: *weight,
                });
            }
            weights.insert(skill, *weight);
        }

        let mut display_names = HashMap::with_capacity(tables.display_names.len());
        for (skill, display) in &tables.display_names {
            let skill = key(skill);
            if !skills.contains(&skill) {
                return Err(VocabularyError::UnknownSkill(skill));
            }
            let display = display.trim().to_string();
            if display.to_lowercase() != skill {
                return Err(VocabularyError::DisplayMismatch { skill, display });
            }
            display_names.insert(skill, display);
        }

        let forms_by_first_token = index_surface_forms(&skills, &aliases);

        Ok(Self {
            skills,
            stop_words,
            aliases,
            display_names,
            weights,
            forms_by_first_token,
        })
    }

    pub fn is_canonical(&self, token: &str) -> bool {
        self.skills.contains(token)
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Alias → canonical skill; identity when the token is not an alias.
    pub fn resolve_alias<'a>(&'a self, token: &'a str) -> &'a str {
        self.aliases.get(token).map(String::as_str).unwrap_or(token)
    }

    pub fn weight(&self, skill: &str) -> u8 {
        self.weights
            .get(skill)
            .copied()
            .unwrap_or(DEFAULT_SKILL_WEIGHT)
    }

    pub fn tier(&self, skill: &str) -> SkillTier {
        SkillTier::from_weight(self.weight(skill))
    }

    /// User-facing name: the display table entry, else the token uppercased.
    pub fn display_name(&self, skill: &str) -> String {
        self.display_names
            .get(skill)
            .cloned()
            .unwrap_or_else(|| skill.to_uppercase())
    }

    /// Inverse of `display_name` for stored display strings.
    pub fn canonical_from_display(&self, display: &str) -> String {
        display.trim().to_lowercase()
    }

    /// Canonical skill of every mention in a normalized token stream, in order.
    ///
    /// Scans left to right across the whole vocabulary. At each position the longest
    /// surface form wins and its tokens are consumed, so `node js` is one `node.js`
    /// mention and never also `javascript`. A lone stop-word never starts a mention.
    pub fn mentions(&self, tokens: &[&str]) -> Vec<&str> {
        let mut found = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let rest = &tokens[i..];
            let hit = self.forms_by_first_token.get(rest[0]).and_then(|candidates| {
                candidates.iter().find(|(form, _)| {
                    form.len() <= rest.len()
                        && form.iter().zip(rest).all(|(f, t)| f.as_str() == *t)
                        && (form.len() > 1 || !self.is_stop_word(rest[0]))
                })
            });
            match hit {
                Some((form, skill)) => {
                    found.push(skill.as_str());
                    i += form.len();
                }
                None => i += 1,
            }
        }
        found
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    pub fn display_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.display_names
            .iter()
            .map(|(skill, display)| (skill.as_str(), display.as_str()))
    }
}

fn key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Surface forms of a skill are its own normalized tokens plus every alias pointing at it.
fn index_surface_forms(
    skills: &HashSet<String>,
    aliases: &HashMap<String, String>,
) -> HashMap<String, Vec<(Vec<String>, String)>> {
    let own = skills.iter().map(|skill| (tokens_of(skill), skill.clone()));
    let aliased = aliases
        .iter()
        .map(|(alias, target)| (tokens_of(alias), target.clone()));

    let mut index: HashMap<String, Vec<(Vec<String>, String)>> = HashMap::new();
    for (form, skill) in own.chain(aliased) {
        if let Some(first) = form.first() {
            index.entry(first.clone()).or_default().push((form, skill));
        }
    }

    for candidates in index.values_mut() {
        candidates.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.cmp(b)));
        candidates.dedup();
    }
    index
}

fn tokens_of(raw: &str) -> Vec<String> {
    normalize(raw)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in tables
// ────────────────────────────────────────────────────────────────────────────

const SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "rust",
    "fastapi",
    "django",
    "flask",
    "react",
    "node.js",
    "docker",
    "kubernetes",
    "terraform",
    "mongodb",
    "postgresql",
    "mysql",
    "redis",
    "nosql",
    "sql",
    "aws",
    "azure",
    "gcp",
    "rest",
    "graphql",
    "jwt",
    "oauth",
    "ci/cd",
    "kafka",
    "rabbitmq",
    "microservices",
    "git",
    "linux",
];

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "while",
    "with", "without", "within", "by", "for", "from",
    "to", "of", "in", "on", "at", "as", "per",
    "is", "are", "was", "were", "be", "been", "being",
    "this", "that", "these", "those",
    "it", "its", "they", "them", "their", "we", "you", "your",
    "will", "would", "should", "can", "could", "may", "might",
    "must", "shall",
    "role", "roles", "responsibility", "responsibilities",
    "required", "requirements", "preferred",
    "experience", "knowledge", "ability",
    "work", "working", "team", "teams",
    "company", "business", "environment",
    "using", "use", "used",
];

const ALIASES: &[(&str, &str)] = &[
    ("postgres", "postgresql"),
    ("psql", "postgresql"),
    ("mongo", "mongodb"),
    ("k8s", "kubernetes"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("nodejs", "node.js"),
    ("node", "node.js"),
    ("reactjs", "react"),
    ("restful", "rest"),
    ("oauth2", "oauth"),
    ("ci", "ci/cd"),
    ("cd", "ci/cd"),
    ("cicd", "ci/cd"),
    ("amqp", "rabbitmq"),
];

const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("python", "Python"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("rust", "Rust"),
    ("fastapi", "FastAPI"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("react", "React"),
    ("node.js", "Node.js"),
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("terraform", "Terraform"),
    ("mongodb", "MongoDB"),
    ("postgresql", "PostgreSQL"),
    ("mysql", "MySQL"),
    ("redis", "Redis"),
    ("nosql", "NoSQL"),
    ("azure", "Azure"),
    ("graphql", "GraphQL"),
    ("oauth", "OAuth"),
    ("ci/cd", "CI/CD"),
    ("kafka", "Kafka"),
    ("rabbitmq", "RabbitMQ"),
    ("microservices", "Microservices"),
    ("git", "Git"),
    ("linux", "Linux"),
];

const WEIGHTS: &[(&str, u8)] = &[
    ("python", 3),
    ("java", 3),
    ("javascript", 3),
    ("fastapi", 3),
    ("typescript", 2),
    ("rust", 2),
    ("django", 2),
    ("flask", 2),
    ("react", 2),
    ("node.js", 2),
    ("docker", 2),
    ("kubernetes", 2),
    ("mongodb", 2),
    ("postgresql", 2),
    ("mysql", 2),
    ("sql", 2),
    ("aws", 2),
    ("rest", 2),
    ("microservices", 2),
];

pub fn builtin_tables() -> VocabularyTables {
    VocabularyTables {
        skills: SKILLS.iter().map(|s| s.to_string()).collect(),
        stop_words: STOP_WORDS.iter().map(|s| s.to_string()).collect(),
        aliases: ALIASES
            .iter()
            .map(|(alias, target)| (alias.to_string(), target.to_string()))
            .collect(),
        display_names: DISPLAY_NAMES
            .iter()
            .map(|(skill, display)| (skill.to_string(), display.to_string()))
            .collect(),
        weights: WEIGHTS
            .iter()
            .map(|(skill, weight)| (skill.to_string(), *weight))
            .collect(),
    }
}
