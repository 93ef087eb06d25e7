use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::AuthService,
    types::{AuthRequest, TokenResponse},
};
use crate::shared::{AppError, AppState};
use crate::validation::ValidatedJson;

/// HTTP handler for registering a new user
///
/// POST /auth/signup
/// Returns an access token for the new account
#[instrument(name = "sign_up", skip(state, request))]
pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AuthRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let service = AuthService::new(
        Arc::clone(&state.user_repository),
        state.token_config.clone(),
    );
    let token = service.sign_up(request).await?;

    info!("Sign up completed");

    Ok((StatusCode::CREATED, Json(token)))
}

/// HTTP handler for exchanging credentials for an access token
///
/// POST /auth/signin
#[instrument(name = "sign_in", skip(state, request))]
pub async fn sign_in(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AuthRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let service = AuthService::new(
        Arc::clone(&state.user_repository),
        state.token_config.clone(),
    );
    let token = service.sign_in(request).await?;

    info!("Sign in completed");

    Ok(Json(token))
}
