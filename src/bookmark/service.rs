use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{BookmarkModel, BookmarkPatch, NewBookmark},
    repository::BookmarkRepository,
    types::CreateBookmarkRequest,
};
use crate::shared::AppError;
use crate::user::UserModel;

const ACCESS_DENIED: &str = "Access to resource denied";

/// Service for handling bookmark business logic, scoped to one owner per call
pub struct BookmarkService {
    repository: Arc<dyn BookmarkRepository + Send + Sync>,
}

impl BookmarkService {
    pub fn new(repository: Arc<dyn BookmarkRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Lists every bookmark the user owns
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn list(&self, user: &UserModel) -> Result<Vec<BookmarkModel>, AppError> {
        let bookmarks = self.repository.list_bookmarks(user.id).await?;
        debug!(count = bookmarks.len(), "Bookmarks listed");
        Ok(bookmarks)
    }

    /// Owner-scoped lookup. Someone else's bookmark is indistinguishable from a
    /// missing one and both come back as `None`.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn get_by_id(
        &self,
        user: &UserModel,
        bookmark_id: i32,
    ) -> Result<Option<BookmarkModel>, AppError> {
        self.repository
            .get_owned_bookmark(bookmark_id, user.id)
            .await
    }

    #[instrument(skip(self, user, request), fields(user_id = user.id))]
    pub async fn create(
        &self,
        user: &UserModel,
        request: CreateBookmarkRequest,
    ) -> Result<BookmarkModel, AppError> {
        let new_bookmark = NewBookmark {
            title: request.title,
            description: request.description,
            link: request.link,
            user_id: user.id,
        };

        let bookmark = self.repository.create_bookmark(&new_bookmark).await?;
        info!(bookmark_id = bookmark.id, "Bookmark created");
        Ok(bookmark)
    }

    #[instrument(skip(self, user, patch), fields(user_id = user.id))]
    pub async fn edit_by_id(
        &self,
        user: &UserModel,
        bookmark_id: i32,
        patch: BookmarkPatch,
    ) -> Result<BookmarkModel, AppError> {
        self.ensure_owner(user, bookmark_id).await?;

        let bookmark = self
            .repository
            .update_bookmark(bookmark_id, &patch)
            .await
            .map_err(deny_if_gone)?;
        info!(bookmark_id, "Bookmark edited");
        Ok(bookmark)
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn delete_by_id(&self, user: &UserModel, bookmark_id: i32) -> Result<(), AppError> {
        self.ensure_owner(user, bookmark_id).await?;

        self.repository
            .delete_bookmark(bookmark_id)
            .await
            .map_err(deny_if_gone)?;
        info!(bookmark_id, "Bookmark deleted");
        Ok(())
    }

    /// Fetches by id alone, then checks the owner. Missing and foreign
    /// bookmarks fail with the same `Forbidden` so callers learn nothing about
    /// which ids exist.
    async fn ensure_owner(&self, user: &UserModel, bookmark_id: i32) -> Result<(), AppError> {
        match self.repository.get_bookmark(bookmark_id).await? {
            Some(bookmark) if bookmark.is_owned_by(user.id) => Ok(()),
            Some(bookmark) => {
                warn!(
                    bookmark_id,
                    owner_id = bookmark.user_id,
                    "Bookmark belongs to another user"
                );
                Err(AppError::Forbidden(ACCESS_DENIED.to_string()))
            }
            None => {
                warn!(bookmark_id, "Bookmark does not exist");
                Err(AppError::Forbidden(ACCESS_DENIED.to_string()))
            }
        }
    }
}

/// A bookmark deleted between the ownership check and the write is reported
/// like any other unknown id
fn deny_if_gone(error: AppError) -> AppError {
    match error {
        AppError::NotFound(_) => {
            warn!("Bookmark disappeared before the write");
            AppError::Forbidden(ACCESS_DENIED.to_string())
        }
        other => other,
    }
}
