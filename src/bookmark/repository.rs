use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{BookmarkModel, BookmarkPatch, NewBookmark};
use crate::shared::AppError;

/// Trait for bookmark repository operations
#[async_trait]
pub trait BookmarkRepository {
    async fn create_bookmark(&self, bookmark: &NewBookmark) -> Result<BookmarkModel, AppError>;

    /// Looks a bookmark up by id alone, regardless of owner
    async fn get_bookmark(&self, bookmark_id: i32) -> Result<Option<BookmarkModel>, AppError>;

    /// Looks a bookmark up by id, only if `owner_id` owns it
    async fn get_owned_bookmark(
        &self,
        bookmark_id: i32,
        owner_id: i32,
    ) -> Result<Option<BookmarkModel>, AppError>;

    /// All bookmarks of one owner, oldest first
    async fn list_bookmarks(&self, owner_id: i32) -> Result<Vec<BookmarkModel>, AppError>;

    async fn update_bookmark(
        &self,
        bookmark_id: i32,
        patch: &BookmarkPatch,
    ) -> Result<BookmarkModel, AppError>;

    async fn delete_bookmark(&self, bookmark_id: i32) -> Result<(), AppError>;
}

/// In-memory implementation of BookmarkRepository for development and testing
///
/// Ids are handed out in increasing order and the map is ordered by id, so
/// listings come back in insertion order like the SQL implementation.
pub struct InMemoryBookmarkRepository {
    state: Mutex<InMemoryBookmarks>,
}

struct InMemoryBookmarks {
    bookmarks: BTreeMap<i32, BookmarkModel>,
    next_id: i32,
}

impl Default for InMemoryBookmarkRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBookmarkRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryBookmarks {
                bookmarks: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Returns the number of stored bookmarks across all owners
    pub fn bookmark_count(&self) -> usize {
        self.lock().bookmarks.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryBookmarks> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BookmarkRepository for InMemoryBookmarkRepository {
    #[instrument(skip(self, bookmark))]
    async fn create_bookmark(&self, bookmark: &NewBookmark) -> Result<BookmarkModel, AppError> {
        debug!(owner_id = bookmark.user_id, "Creating bookmark in memory");

        let mut state = self.lock();
        let now = Utc::now();
        let model = BookmarkModel {
            id: state.next_id,
            title: bookmark.title.clone(),
            description: bookmark.description.clone(),
            link: bookmark.link.clone(),
            user_id: bookmark.user_id,
            created_at: now,
            updated_at: now,
        };
        state.next_id += 1;
        state.bookmarks.insert(model.id, model.clone());

        debug!(bookmark_id = model.id, "Bookmark created successfully in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_bookmark(&self, bookmark_id: i32) -> Result<Option<BookmarkModel>, AppError> {
        debug!(bookmark_id, "Fetching bookmark from memory");
        Ok(self.lock().bookmarks.get(&bookmark_id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_owned_bookmark(
        &self,
        bookmark_id: i32,
        owner_id: i32,
    ) -> Result<Option<BookmarkModel>, AppError> {
        debug!(bookmark_id, owner_id, "Fetching owned bookmark from memory");
        Ok(self
            .lock()
            .bookmarks
            .get(&bookmark_id)
            .filter(|b| b.is_owned_by(owner_id))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_bookmarks(&self, owner_id: i32) -> Result<Vec<BookmarkModel>, AppError> {
        debug!(owner_id, "Listing bookmarks in memory");
        Ok(self
            .lock()
            .bookmarks
            .values()
            .filter(|b| b.is_owned_by(owner_id))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, patch))]
    async fn update_bookmark(
        &self,
        bookmark_id: i32,
        patch: &BookmarkPatch,
    ) -> Result<BookmarkModel, AppError> {
        debug!(bookmark_id, "Updating bookmark in memory");

        let mut state = self.lock();
        let bookmark = state.bookmarks.get_mut(&bookmark_id).ok_or_else(|| {
            warn!(bookmark_id, "Bookmark not found for update in memory");
            AppError::NotFound("Bookmark not found".to_string())
        })?;
        bookmark.apply(patch);

        debug!(bookmark_id, "Bookmark updated successfully in memory");
        Ok(bookmark.clone())
    }

    #[instrument(skip(self))]
    async fn delete_bookmark(&self, bookmark_id: i32) -> Result<(), AppError> {
        debug!(bookmark_id, "Deleting bookmark from memory");

        if self.lock().bookmarks.remove(&bookmark_id).is_none() {
            warn!(bookmark_id, "Bookmark not found for deletion in memory");
            return Err(AppError::NotFound("Bookmark not found".to_string()));
        }

        debug!(bookmark_id, "Bookmark deleted successfully from memory");
        Ok(())
    }
}

/// PostgreSQL implementation of bookmark repository
pub struct PostgresBookmarkRepository {
    pool: PgPool,
}

impl PostgresBookmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookmarkRepository for PostgresBookmarkRepository {
    #[instrument(skip(self, bookmark))]
    async fn create_bookmark(&self, bookmark: &NewBookmark) -> Result<BookmarkModel, AppError> {
        debug!(owner_id = bookmark.user_id, "Creating bookmark in database");

        let model = sqlx::query_as::<_, BookmarkModel>(
            "INSERT INTO bookmarks (title, description, link, user_id) VALUES ($1, $2, $3, $4) \
             RETURNING id, title, description, link, user_id, created_at, updated_at",
        )
        .bind(&bookmark.title)
        .bind(&bookmark.description)
        .bind(&bookmark.link)
        .bind(bookmark.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create bookmark in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(bookmark_id = model.id, "Bookmark created successfully in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_bookmark(&self, bookmark_id: i32) -> Result<Option<BookmarkModel>, AppError> {
        debug!(bookmark_id, "Fetching bookmark from database");

        sqlx::query_as::<_, BookmarkModel>(
            "SELECT id, title, description, link, user_id, created_at, updated_at \
             FROM bookmarks WHERE id = $1",
        )
        .bind(bookmark_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, bookmark_id, "Failed to fetch bookmark from database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn get_owned_bookmark(
        &self,
        bookmark_id: i32,
        owner_id: i32,
    ) -> Result<Option<BookmarkModel>, AppError> {
        debug!(bookmark_id, owner_id, "Fetching owned bookmark from database");

        sqlx::query_as::<_, BookmarkModel>(
            "SELECT id, title, description, link, user_id, created_at, updated_at \
             FROM bookmarks WHERE id = $1 AND user_id = $2",
        )
        .bind(bookmark_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, bookmark_id, "Failed to fetch owned bookmark from database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn list_bookmarks(&self, owner_id: i32) -> Result<Vec<BookmarkModel>, AppError> {
        debug!(owner_id, "Listing bookmarks in database");

        let bookmarks = sqlx::query_as::<_, BookmarkModel>(
            "SELECT id, title, description, link, user_id, created_at, updated_at \
             FROM bookmarks WHERE user_id = $1 ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, owner_id, "Failed to list bookmarks from database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(owner_id, count = bookmarks.len(), "Bookmarks listed from database");
        Ok(bookmarks)
    }

    #[instrument(skip(self, patch))]
    async fn update_bookmark(
        &self,
        bookmark_id: i32,
        patch: &BookmarkPatch,
    ) -> Result<BookmarkModel, AppError> {
        debug!(bookmark_id, "Updating bookmark in database");

        let updated = sqlx::query_as::<_, BookmarkModel>(
            "UPDATE bookmarks SET \
                 title = COALESCE($2, title), \
                 description = CASE WHEN $3 THEN $4 ELSE description END, \
                 link = COALESCE($5, link), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, title, description, link, user_id, created_at, updated_at",
        )
        .bind(bookmark_id)
        .bind(&patch.title)
        .bind(patch.description.is_some())
        .bind(patch.description.as_ref().and_then(|d| d.as_deref()))
        .bind(&patch.link)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, bookmark_id, "Failed to update bookmark in database");
            AppError::DatabaseError(e.to_string())
        })?;

        updated.ok_or_else(|| {
            warn!(bookmark_id, "Bookmark not found for update");
            AppError::NotFound("Bookmark not found".to_string())
        })
    }

    #[instrument(skip(self))]
    async fn delete_bookmark(&self, bookmark_id: i32) -> Result<(), AppError> {
        debug!(bookmark_id, "Deleting bookmark from database");

        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1")
            .bind(bookmark_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, bookmark_id, "Failed to delete bookmark from database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(bookmark_id, "Bookmark not found for deletion");
            return Err(AppError::NotFound("Bookmark not found".to_string()));
        }

        debug!(bookmark_id, "Bookmark deleted successfully from database");
        Ok(())
    }
}
