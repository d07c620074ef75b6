//! Accounts and bearer-token authentication.
//!
//! `/auth/login` issues HS256 tokens whose `sub` is the user id; every other `/api/v1`
//! route verifies signature and expiry through the `AuthUser` extractor.

pub mod handlers;
pub mod password;
pub mod users;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub role: String,
    pub exp: usize,
}

/// Signs an access token for `user_id` that expires after the configured TTL.
pub fn issue_token(config: &AuthConfig, user_id: Uuid, role: &str) -> Result<String, AppError> {
    let exp = chrono::Utc::now() + chrono::Duration::minutes(config.token_ttl_minutes);
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: exp.timestamp().max(0) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {e}")))
}

/// The authenticated caller. Every owned resource is scoped by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AuthConfig::from_ref(state);
        authorize(parts, &config).map_err(|reason| {
            debug!("Rejected request: {reason}");
            AppError::Unauthorized
        })
    }
}

fn authorize(parts: &Parts, config: &AuthConfig) -> Result<AuthUser, String> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| "missing Authorization header".to_string())?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| "expected Bearer token".to_string())?;

    let data = decode::<Claims>(
        token.trim(),
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|err| format!("invalid token: {err}"))?;

    let user_id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| format!("subject '{}' is not a user id", data.claims.sub))?;

    Ok(AuthUser(user_id))
}

#[cfg(test)]
pub mod test_support {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    use super::Claims;

    /// Signs a token for `user_id` that expires `ttl_secs` from now (negative = already expired).
    pub fn token_for(secret: &str, user_id: Uuid, ttl_secs: i64) -> String {
        let exp = (chrono::Utc::now().timestamp() + ttl_secs).max(0) as usize;
        encode(
            &Header::default(),
            &Claims {
                sub: user_id.to_string(),
                role: "user".to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }
}
