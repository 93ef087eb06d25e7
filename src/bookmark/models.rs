use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for bookmarks table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkModel {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub user_id: i32, // Owner; the only user allowed to see or change the record
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert a bookmark
#[derive(Debug, Clone)]
pub struct NewBookmark {
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub user_id: i32,
}

/// Partial bookmark update. `None` leaves the column untouched and
/// `Some(None)` clears the nullable description.
#[derive(Debug, Clone, Default)]
pub struct BookmarkPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub link: Option<String>,
}

impl BookmarkModel {
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }

    /// Applies the provided fields of `patch` in place
    pub fn apply(&mut self, patch: &BookmarkPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(link) = &patch.link {
            self.link = link.clone();
        }
        self.updated_at = Utc::now();
    }
}
