use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::UserModel,
    service::UserService,
    types::{EditUserRequest, UserResponse},
};
use crate::shared::{AppError, AppState};
use crate::validation::ValidatedPatch;

/// HTTP handler for reading the caller's profile
///
/// GET /users/me
#[instrument(name = "get_me", skip(state, user), fields(user_id = user.id))]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
) -> Json<UserResponse> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    Json(service.get_me(user))
}

/// HTTP handler for partially editing the caller's profile
///
/// PATCH /users
#[instrument(name = "edit_user", skip(state, user, request), fields(user_id = user.id))]
pub async fn edit_user(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
    ValidatedPatch(request): ValidatedPatch<EditUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    let profile = service.edit_user(&user, request.into()).await?;

    info!(email = %profile.email, "User edited successfully");

    Ok(Json(profile))
}
