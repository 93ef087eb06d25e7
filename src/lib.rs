// Library crate for the bookmarks API
// This file exposes the public API for the binary and integration tests

pub mod auth;
pub mod bookmark;
pub mod config;
pub mod database;
pub mod shared;
pub mod user;
pub mod validation;

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, Method, Uri},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::debug;

// Re-export commonly used types for easier access in tests
pub use bookmark::{repository::InMemoryBookmarkRepository, BookmarkModel};
pub use config::AppConfig;
pub use database::Database;
pub use shared::{AppError, AppState};
pub use user::{repository::InMemoryUserRepository, UserModel};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn unknown_route(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Cannot {} {}", method, uri.path()))
}

/// Gives the bodiless errors produced below the handlers (405 from method
/// routing, 408 from the timeout layer) the same JSON shape as `AppError`.
async fn json_error_bodies(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let status = response.status();

    let is_error = status.is_client_error() || status.is_server_error();
    if is_error && response.headers().get(CONTENT_TYPE).is_none() {
        debug!(status = status.as_u16(), "Adding JSON body to bare error response");
        let reason = status.canonical_reason().unwrap_or("Error");
        return shared::error_response(status, reason);
    }

    response
}

/// Builds the full HTTP surface. Everything except `/auth/*` and `/health`
/// runs behind the JWT middleware.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let protected = Router::new()
        .route("/users/me", get(user::get_me))
        .route("/users", patch(user::edit_user))
        .route(
            "/bookmarks",
            get(bookmark::list_bookmarks).post(bookmark::create_bookmark),
        )
        .route(
            "/bookmarks/:id",
            get(bookmark::get_bookmark)
                .patch(bookmark::edit_bookmark)
                .delete(bookmark::delete_bookmark),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::jwt_auth));

    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .merge(protected)
        .fallback(unknown_route)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(json_error_bodies))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
