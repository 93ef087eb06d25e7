use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::BookmarkModel,
    service::BookmarkService,
    types::{CreateBookmarkRequest, EditBookmarkRequest},
};
use crate::shared::{AppError, AppState};
use crate::user::UserModel;
use crate::validation::{ValidatedJson, ValidatedPatch, ValidatedPath};

/// HTTP handler for listing the caller's bookmarks
///
/// GET /bookmarks
#[instrument(name = "list_bookmarks", skip(state, user), fields(user_id = user.id))]
pub async fn list_bookmarks(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
) -> Result<Json<Vec<BookmarkModel>>, AppError> {
    let service = BookmarkService::new(Arc::clone(&state.bookmark_repository));
    let bookmarks = service.list(&user).await?;

    info!(bookmark_count = bookmarks.len(), "Bookmarks listed successfully");

    Ok(Json(bookmarks))
}

/// HTTP handler for fetching one of the caller's bookmarks
///
/// GET /bookmarks/:id
/// Returns `null` when the bookmark is missing or owned by someone else
#[instrument(name = "get_bookmark", skip(state, user), fields(user_id = user.id))]
pub async fn get_bookmark(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
    ValidatedPath(bookmark_id): ValidatedPath<i32>,
) -> Result<Json<Option<BookmarkModel>>, AppError> {
    let service = BookmarkService::new(Arc::clone(&state.bookmark_repository));
    let bookmark = service.get_by_id(&user, bookmark_id).await?;

    info!(bookmark_id, found = bookmark.is_some(), "Bookmark lookup finished");

    Ok(Json(bookmark))
}

/// HTTP handler for creating a bookmark owned by the caller
///
/// POST /bookmarks
#[instrument(name = "create_bookmark", skip(state, user, request), fields(user_id = user.id))]
pub async fn create_bookmark(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
    ValidatedJson(request): ValidatedJson<CreateBookmarkRequest>,
) -> Result<(StatusCode, Json<BookmarkModel>), AppError> {
    let service = BookmarkService::new(Arc::clone(&state.bookmark_repository));
    let bookmark = service.create(&user, request).await?;

    info!(bookmark_id = bookmark.id, "Bookmark created successfully");

    Ok((StatusCode::CREATED, Json(bookmark)))
}

/// HTTP handler for partially editing a bookmark
///
/// PATCH /bookmarks/:id
#[instrument(name = "edit_bookmark", skip(state, user, request), fields(user_id = user.id))]
pub async fn edit_bookmark(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
    ValidatedPath(bookmark_id): ValidatedPath<i32>,
    ValidatedPatch(request): ValidatedPatch<EditBookmarkRequest>,
) -> Result<Json<BookmarkModel>, AppError> {
    let service = BookmarkService::new(Arc::clone(&state.bookmark_repository));
    let bookmark = service
        .edit_by_id(&user, bookmark_id, request.into())
        .await?;

    info!(bookmark_id, "Bookmark edited successfully");

    Ok(Json(bookmark))
}

/// HTTP handler for deleting a bookmark
///
/// DELETE /bookmarks/:id
#[instrument(name = "delete_bookmark", skip(state, user), fields(user_id = user.id))]
pub async fn delete_bookmark(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
    ValidatedPath(bookmark_id): ValidatedPath<i32>,
) -> Result<StatusCode, AppError> {
    let service = BookmarkService::new(Arc::clone(&state.bookmark_repository));
    service.delete_by_id(&user, bookmark_id).await?;

    info!(bookmark_id, "Bookmark deleted successfully");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmark::repository::InMemoryBookmarkRepository;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::Request,
        routing::get,
        Router,
    };
    use chrono::Utc;
    use tower::ServiceExt; // for `oneshot`

    fn user(id: i32) -> UserModel {
        let now = Utc::now();
        UserModel {
            id,
            email: format!("user{}@email.com", id),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Router acting as `user`, sharing `repo` with other routers
    fn app_as(user: UserModel, repo: Arc<InMemoryBookmarkRepository>) -> Router {
        let app_state = AppStateBuilder::new()
            .with_bookmark_repository(repo)
            .build();

        Router::new()
            .route("/bookmarks", get(list_bookmarks).post(create_bookmark))
            .route(
                "/bookmarks/:id",
                get(get_bookmark)
                    .patch(edit_bookmark)
                    .delete(delete_bookmark),
            )
            .layer(Extension(user))
            .with_state(app_state)
    }

    fn json_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_create_bookmark_handler() {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        let app = app_as(user(1), repo.clone());

        let response = app
            .oneshot(json_request(
                "POST",
                "/bookmarks",
                r#"{"title": "Bookmark for google", "link": "http://google.com", "description": "A bookmark description"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let value = body_json(response).await;
        assert_eq!(value["title"], "Bookmark for google");
        assert_eq!(value["link"], "http://google.com");
        assert_eq!(value["description"], "A bookmark description");
        assert_eq!(value["userId"], 1);
        assert!(value["id"].is_number());
        assert_eq!(repo.bookmark_count(), 1);
    }

    #[tokio::test]
    async fn test_create_bookmark_handler_missing_link() {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        let response = app_as(user(1), repo.clone())
            .oneshot(json_request("POST", "/bookmarks", r#"{"title": "G"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(repo.bookmark_count(), 0);
    }

    #[tokio::test]
    async fn test_create_bookmark_handler_empty_title() {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        let response = app_as(user(1), repo)
            .oneshot(json_request(
                "POST",
                "/bookmarks",
                r#"{"title": "", "link": "http://google.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_bookmark_handler_returns_null_for_foreign() {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        let created = app_as(user(1), repo.clone())
            .oneshot(json_request(
                "POST",
                "/bookmarks",
                r#"{"title": "G", "link": "http://google.com"}"#,
            ))
            .await
            .unwrap();
        let id = body_json(created).await["id"].as_i64().unwrap();

        let response = app_as(user(2), repo)
            .oneshot(empty_request("GET", &format!("/bookmarks/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await.is_null());
    }

    #[tokio::test]
    async fn test_get_bookmark_handler_non_integer_id() {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        let response = app_as(user(1), repo)
            .oneshot(empty_request("GET", "/bookmarks/abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_edit_bookmark_handler_forbidden_for_foreign() {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        let created = app_as(user(1), repo.clone())
            .oneshot(json_request(
                "POST",
                "/bookmarks",
                r#"{"title": "G", "link": "http://google.com"}"#,
            ))
            .await
            .unwrap();
        let id = body_json(created).await["id"].as_i64().unwrap();

        let uri = format!("/bookmarks/{}", id);
        let request = Request::builder()
            .method("PATCH")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"title": "mine now"}"#))
            .unwrap();
        let response = app_as(user(2), repo).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let value = body_json(response).await;
        assert_eq!(value["error"], "Access to resource denied");
    }

    #[tokio::test]
    async fn test_edit_bookmark_handler() {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        let created = app_as(user(1), repo.clone())
            .oneshot(json_request(
                "POST",
                "/bookmarks",
                r#"{"title": "G", "link": "http://google.com"}"#,
            ))
            .await
            .unwrap();
        let id = body_json(created).await["id"].as_i64().unwrap();

        let request = Request::builder()
            .method("PATCH")
            .uri(format!("/bookmarks/{}", id))
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"title": "Bookmark title changed for edit", "description": "Bookmark description changed for edit"}"#,
            ))
            .unwrap();
        let response = app_as(user(1), repo).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let value = body_json(response).await;
        assert_eq!(value["title"], "Bookmark title changed for edit");
        assert_eq!(value["description"], "Bookmark description changed for edit");
        assert_eq!(value["link"], "http://google.com");
    }

    #[tokio::test]
    async fn test_delete_bookmark_handler() {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        let created = app_as(user(1), repo.clone())
            .oneshot(json_request(
                "POST",
                "/bookmarks",
                r#"{"title": "G", "link": "http://google.com"}"#,
            ))
            .await
            .unwrap();
        let id = body_json(created).await["id"].as_i64().unwrap();
        let uri = format!("/bookmarks/{}", id);

        let forbidden = app_as(user(2), repo.clone())
            .oneshot(empty_request("DELETE", &uri))
            .await
            .unwrap();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let response = app_as(user(1), repo.clone())
            .oneshot(empty_request("DELETE", &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(repo.bookmark_count(), 0);
    }

    async fn create_owned(repo: &Arc<InMemoryBookmarkRepository>, body: &'static str) -> String {
        let created = app_as(user(1), repo.clone())
            .oneshot(json_request("POST", "/bookmarks", body))
            .await
            .unwrap();
        format!("/bookmarks/{}", body_json(created).await["id"])
    }

    #[tokio::test]
    async fn test_edit_bookmark_handler_without_body() {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        let uri = create_owned(
            &repo,
            r#"{"title": "G", "link": "http://google.com", "description": "d"}"#,
        )
        .await;

        let response = app_as(user(1), repo)
            .oneshot(empty_request("PATCH", &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let value = body_json(response).await;
        assert_eq!(value["title"], "G");
        assert_eq!(value["description"], "d");
    }

    #[tokio::test]
    async fn test_edit_bookmark_handler_null_clears_description() {
        let repo = Arc::new(InMemoryBookmarkRepository::new());
        let uri = create_owned(
            &repo,
            r#"{"title": "G", "link": "http://google.com", "description": "d"}"#,
        )
        .await;

        let request = Request::builder()
            .method("PATCH")
            .uri(&uri)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"description": null}"#))
            .unwrap();
        let response = app_as(user(1), repo.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["description"].is_null());

        let fetched = app_as(user(1), repo)
            .oneshot(empty_request("GET", &uri))
            .await
            .unwrap();
        let value = body_json(fetched).await;
        assert!(value["description"].is_null());
        assert_eq!(value["link"], "http://google.com");
    }
}
