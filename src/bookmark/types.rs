use serde::Deserialize;
use validator::Validate;

use super::models::BookmarkPatch;
use crate::validation::present;

/// Request payload for creating a bookmark
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookmarkRequest {
    #[validate(length(min = 1, message = "title should not be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "link should not be empty"))]
    pub link: String,
}

/// Request payload for editing a bookmark; every field is optional.
/// `"description": null` clears the description.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditBookmarkRequest {
    #[validate(length(min = 1, message = "title should not be empty"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[validate(length(min = 1, message = "link should not be empty"))]
    pub link: Option<String>,
}

impl From<EditBookmarkRequest> for BookmarkPatch {
    fn from(request: EditBookmarkRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            link: request.link,
        }
    }
}
