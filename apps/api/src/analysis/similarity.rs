//! Semantic similarity: pluggable, trait-based scorer comparing résumé and JD text.
//!
//! Default: `LexicalSimilarity` (term-frequency cosine, pure Rust, deterministic).
//! Optional: `EmbeddingSimilarity` (OpenAI-compatible `/embeddings` endpoint).
//!
//! `AppState` holds an `Arc<dyn SimilarityScorer>`, chosen at startup via `SIMILARITY_BACKEND`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::scoring::to_percentage;
use crate::analysis::text::normalize;
use crate::analysis::vocabulary::SkillVocabulary;
use crate::config::{Config, SimilarityBackend};
use crate::errors::AppError;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("expected 2 embeddings, got {0}")]
    MissingEmbeddings(usize),

    #[error("embedding dimensions don't match: {0} vs {1}")]
    DimensionMismatch(usize, usize),

    #[error("EMBEDDING_API_URL is required for the embedding backend")]
    MissingEndpoint,
}

impl From<SimilarityError> for AppError {
    fn from(err: SimilarityError) -> Self {
        AppError::Similarity(err.to_string())
    }
}

/// Semantic closeness of résumé and JD text on a 0–100 scale.
/// Either text empty → 0.
#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    async fn score(&self, resume_text: &str, jd_text: &str) -> Result<u8, AppError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Picks the backend named in config.
pub fn build_similarity_scorer(
    config: &Config,
    vocabulary: Arc<SkillVocabulary>,
) -> Result<Arc<dyn SimilarityScorer>, SimilarityError> {
    Ok(match config.similarity_backend {
        SimilarityBackend::Lexical => Arc::new(LexicalSimilarity::new(vocabulary)),
        SimilarityBackend::Embedding => {
            let url = config
                .embedding_api_url
                .clone()
                .ok_or(SimilarityError::MissingEndpoint)?;
            Arc::new(EmbeddingSimilarity::new(
                url,
                config.embedding_api_key.clone(),
                config.embedding_model.clone(),
            )?)
        }
    })
}

// ────────────────────────────────────────────────────────────────────────────
// LexicalSimilarity (default)
// ────────────────────────────────────────────────────────────────────────────

/// Cosine similarity of term-frequency vectors over normalized, stop-word-filtered,
/// alias-resolved tokens.
pub struct LexicalSimilarity {
    vocabulary: Arc<SkillVocabulary>,
}

impl LexicalSimilarity {
    pub fn new(vocabulary: Arc<SkillVocabulary>) -> Self {
        Self { vocabulary }
    }

    fn term_frequencies(&self, text: &str) -> HashMap<String, f64> {
        let mut tf = HashMap::new();
        for token in normalize(text).split_whitespace() {
            if self.vocabulary.is_stop_word(token) {
                continue;
            }
            *tf.entry(self.vocabulary.resolve_alias(token).to_string())
                .or_insert(0.0) += 1.0;
        }
        tf
    }

    pub fn compare(&self, resume_text: &str, jd_text: &str) -> u8 {
        let resume = self.term_frequencies(resume_text);
        let jd = self.term_frequencies(jd_text);
        if resume.is_empty() || jd.is_empty() {
            return 0;
        }

        let dot: f64 = resume
            .iter()
            .filter_map(|(term, a)| jd.get(term).map(|b| a * b))
            .sum();
        let norm = |v: &HashMap<String, f64>| v.values().map(|x| x * x).sum::<f64>().sqrt();
        to_percentage(dot / (norm(&resume) * norm(&jd)) * 100.0)
    }
}

#[async_trait]
impl SimilarityScorer for LexicalSimilarity {
    async fn score(&self, resume_text: &str, jd_text: &str) -> Result<u8, AppError> {
        Ok(self.compare(resume_text, jd_text))
    }

    fn backend(&self) -> &'static str {
        "lexical"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// EmbeddingSimilarity (remote model)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 2],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct EmbeddingSimilarity {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl EmbeddingSimilarity {
    pub fn new(
        url: String,
        api_key: Option<String>,
        model: String,
    ) -> Result<Self, SimilarityError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            url,
            api_key,
            model,
        })
    }

    /// Embeds both texts in one request. Retries 429 and 5xx with exponential backoff.
    async fn embed_pair(&self, a: &str, b: &str) -> Result<(Vec<f32>, Vec<f32>), SimilarityError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: [a, b],
        };
        let mut last_error: Option<SimilarityError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&self.url).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(SimilarityError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, message);
                last_error = Some(SimilarityError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }
            if !status.is_success() {
                return Err(SimilarityError::Api {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }

            let mut parsed: EmbeddingResponse = response.json().await?;
            if parsed.data.len() != 2 {
                return Err(SimilarityError::MissingEmbeddings(parsed.data.len()));
            }
            parsed.data.sort_by_key(|d| d.index);
            let second = parsed.data.pop().map(|d| d.embedding).unwrap_or_default();
            let first = parsed.data.pop().map(|d| d.embedding).unwrap_or_default();
            debug!("Embedding call succeeded: dim={}", first.len());
            return Ok((first, second));
        }

        Err(last_error.unwrap_or(SimilarityError::Api {
            status: 429,
            message: format!("rate limited after {MAX_RETRIES} retries"),
        }))
    }
}

#[async_trait]
impl SimilarityScorer for EmbeddingSimilarity {
    async fn score(&self, resume_text: &str, jd_text: &str) -> Result<u8, AppError> {
        if resume_text.trim().is_empty() || jd_text.trim().is_empty() {
            return Ok(0);
        }
        let (resume, jd) = self.embed_pair(resume_text, jd_text).await?;
        let cosine = cosine_similarity(&resume, &jd)?;
        Ok(to_percentage(cosine * 100.0))
    }

    fn backend(&self) -> &'static str {
        "embedding"
    }
}

/// Cosine of two dense vectors; 0 when either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch(a.len(), b.len()));
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}
