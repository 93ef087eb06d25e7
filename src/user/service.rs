use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{UserModel, UserPatch},
    repository::UserRepository,
    types::UserResponse,
};
use crate::shared::AppError;

/// Service for the authenticated user's own profile
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Returns the profile of an already-resolved user
    pub fn get_me(&self, user: UserModel) -> UserResponse {
        UserResponse::from(user)
    }

    /// Applies a partial profile update to the caller's own record
    #[instrument(skip(self, user, patch), fields(user_id = user.id))]
    pub async fn edit_user(
        &self,
        user: &UserModel,
        patch: UserPatch,
    ) -> Result<UserResponse, AppError> {
        info!(
            email_changed = patch.email.is_some(),
            first_name_changed = patch.first_name.is_some(),
            last_name_changed = patch.last_name.is_some(),
            "Editing user profile"
        );

        match self.repository.update_user(user.id, &patch).await {
            Ok(updated) => {
                info!("User profile updated");
                Ok(UserResponse::from(updated))
            }
            Err(error) => {
                warn!("User profile update failed: {}", error);
                Err(error)
            }
        }
    }
}
