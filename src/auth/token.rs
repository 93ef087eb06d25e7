use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::types::TokenClaims;
use crate::shared::AppError;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: Arc<str>,
    pub expiration_minutes: i64,
}

impl TokenConfig {
    pub fn new(secret: &str, expiration_minutes: i64) -> Self {
        Self {
            secret: Arc::from(secret),
            expiration_minutes,
        }
    }

    /// Signs an HS256 access token for the given user
    #[instrument(skip(self, email))]
    pub fn create_token(&self, user_id: i32, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.expiration_minutes)).timestamp() as usize;

        debug!(
            expiration_minutes = self.expiration_minutes,
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = TokenClaims {
            sub: user_id,
            email: email.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            warn!(error = %e, "Failed to encode JWT token");
            AppError::Internal
        })
    }

    /// Verifies signature and expiry and returns the claims
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, AppError> {
        debug!("Decoding and validating JWT token");

        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(
                user_id = data.claims.sub,
                exp = data.claims.exp,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}
