use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    password::{hash_password, verify_password},
    token::TokenConfig,
    types::{AuthRequest, TokenResponse},
};
use crate::shared::AppError;
use crate::user::{models::NewUser, repository::UserRepository, UserModel};

const BAD_CREDENTIALS: &str = "Credentials incorrect";

/// Service for sign-up, sign-in and token authentication
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>, token_config: TokenConfig) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    /// Registers a new user and returns an access token for it
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: AuthRequest) -> Result<TokenResponse, AppError> {
        info!("Starting sign up");

        let password_hash = hash_password(&request.password)?;
        let user = self
            .repository
            .create_user(&NewUser {
                email: request.email,
                password_hash,
            })
            .await
            .map_err(|error| {
                warn!("Sign up failed: {}", error);
                error
            })?;

        info!(user_id = user.id, "User signed up");
        self.issue_token(&user)
    }

    /// Checks credentials and returns an access token. Unknown email and wrong
    /// password fail with the same error.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_in(&self, request: AuthRequest) -> Result<TokenResponse, AppError> {
        let user = match self.repository.get_user_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                warn!("Sign in attempted for unknown email");
                return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(&request.password, &user.password_hash)? {
            warn!(user_id = user.id, "Sign in attempted with wrong password");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        info!(user_id = user.id, "User signed in");
        self.issue_token(&user)
    }

    /// Resolves a bearer token to the user it was issued for, read fresh from
    /// the repository
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<UserModel, AppError> {
        let claims = self.token_config.validate_token(token)?;

        match self.repository.get_user(claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = claims.sub, "Token refers to a user that no longer exists");
                Err(AppError::Unauthorized("Invalid or expired token".to_string()))
            }
        }
    }

    fn issue_token(&self, user: &UserModel) -> Result<TokenResponse, AppError> {
        let access_token = self.token_config.create_token(user.id, &user.email)?;
        Ok(TokenResponse { access_token })
    }
}
