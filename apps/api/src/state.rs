use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use axum::extract::FromRef;
use sqlx::PgPool;

use crate::analysis::similarity::SimilarityScorer;
use crate::analysis::vocabulary::SkillVocabulary;
use crate::auth::users::UserStore;
use crate::auth::AuthConfig;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Read-only skill tables, built once at startup.
    pub vocabulary: Arc<SkillVocabulary>,
    /// Pluggable similarity backend. Default: LexicalSimilarity. Swap via SIMILARITY_BACKEND.
    pub similarity: Arc<dyn SimilarityScorer>,
    /// Account storage. Postgres in production.
    pub users: Arc<dyn UserStore>,
}

impl FromRef<AppState> for AuthConfig {
    fn from_ref(state: &AppState) -> Self {
        AuthConfig {
            jwt_secret: state.config.jwt_secret.clone(),
            token_ttl_minutes: state.config.jwt_expire_minutes,
        }
    }
}
