use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::TokenConfig;
use crate::bookmark::repository::{BookmarkRepository, PostgresBookmarkRepository};
use crate::database::Database;
use crate::user::repository::{PostgresUserRepository, UserRepository};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub bookmark_repository: Arc<dyn BookmarkRepository + Send + Sync>,
    pub token_config: TokenConfig,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        bookmark_repository: Arc<dyn BookmarkRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            user_repository,
            bookmark_repository,
            token_config,
        }
    }

    /// Wires the PostgreSQL repositories onto a shared pool
    pub fn with_database(database: &Database, token_config: TokenConfig) -> Self {
        Self::new(
            Arc::new(PostgresUserRepository::new(database.pool().clone())),
            Arc::new(PostgresBookmarkRepository::new(database.pool().clone())),
            token_config,
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_) | AppError::DatabaseError(_) | AppError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self {
            AppError::Validation(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg,
            // Storage and config detail is logged where it happens, not returned
            AppError::Config(_) | AppError::DatabaseError(_) | AppError::Internal => {
                "Internal server error".to_string()
            }
        };

        error_response(status, &error_message)
    }
}

/// The `{"statusCode", "error"}` body every failure is reported with
pub fn error_response(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "statusCode": status.as_u16(),
        "error": message
    }));

    (status, body).into_response()
}
