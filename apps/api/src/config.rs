use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::analysis::scoring::ScoreWeights;

/// Which `SimilarityScorer` backend to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityBackend {
    Lexical,
    Embedding,
}

impl FromStr for SimilarityBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" => Ok(SimilarityBackend::Lexical),
            "embedding" => Ok(SimilarityBackend::Embedding),
            other => bail!("unknown SIMILARITY_BACKEND '{other}' (expected 'lexical' or 'embedding')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub jwt_secret: String,
    /// Lifetime of tokens issued by `/auth/login`.
    pub jwt_expire_minutes: i64,
    pub port: u16,
    pub rust_log: String,
    pub skill_vocabulary_path: Option<PathBuf>,
    pub similarity_backend: SimilarityBackend,
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub score_weights: ScoreWeights,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ScoreWeights::default();
        let score_weights = ScoreWeights {
            ats: parse_env("ATS_WEIGHT", defaults.ats)?,
            similarity: parse_env("SIMILARITY_WEIGHT", defaults.similarity)?,
        };
        validate_weights(&score_weights)?;

        let jwt_expire_minutes = parse_env("JWT_EXPIRE_MINUTES", 1440i64)?;
        if jwt_expire_minutes <= 0 {
            bail!("JWT_EXPIRE_MINUTES must be positive (got {jwt_expire_minutes})");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_expire_minutes,
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            skill_vocabulary_path: optional_env("SKILL_VOCABULARY_PATH").map(PathBuf::from),
            similarity_backend: parse_env("SIMILARITY_BACKEND", SimilarityBackend::Lexical)?,
            embedding_api_url: optional_env("EMBEDDING_API_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| "all-MiniLM-L6-v2".to_string()),
            score_weights,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        None => Ok(default),
    }
}

/// Weights must be finite, non-negative and not both zero, or the final score is meaningless.
fn validate_weights(weights: &ScoreWeights) -> Result<()> {
    for (name, value) in [("ATS_WEIGHT", weights.ats), ("SIMILARITY_WEIGHT", weights.similarity)] {
        if !value.is_finite() || value < 0.0 {
            bail!("{name} must be a non-negative number (got {value})");
        }
    }
    if weights.ats + weights.similarity == 0.0 {
        bail!("ATS_WEIGHT and SIMILARITY_WEIGHT cannot both be zero");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_backend_parses_case_insensitively() {
        assert_eq!(
            "Embedding".parse::<SimilarityBackend>().unwrap(),
            SimilarityBackend::Embedding
        );
        assert_eq!(
            " lexical ".parse::<SimilarityBackend>().unwrap(),
            SimilarityBackend::Lexical
        );
        assert!("neural".parse::<SimilarityBackend>().is_err());
    }

    #[test]
    fn test_default_weights_are_valid() {
        assert!(validate_weights(&ScoreWeights::default()).is_ok());
    }

    #[test]
    fn test_negative_or_zero_weights_rejected() {
        assert!(validate_weights(&ScoreWeights {
            ats: -0.1,
            similarity: 0.6
        })
        .is_err());
        assert!(validate_weights(&ScoreWeights {
            ats: 0.0,
            similarity: 0.0
        })
        .is_err());
        assert!(validate_weights(&ScoreWeights {
            ats: f64::NAN,
            similarity: 0.6
        })
        .is_err());
    }
}
