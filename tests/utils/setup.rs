use axum::Router;
use std::sync::Arc;
use std::time::Duration;

use bookmarks_api::{
    auth::TokenConfig, build_router, AppState, InMemoryBookmarkRepository, InMemoryUserRepository,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestSetup {
    pub app: Router,
    pub user_repository: Arc<InMemoryUserRepository>,
    pub bookmark_repository: Arc<InMemoryBookmarkRepository>,
}

pub struct TestSetupBuilder {
    token_expiration_minutes: i64,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            token_expiration_minutes: 15,
        }
    }

    /// Issues tokens that are already expired when they reach the middleware
    pub fn with_expired_tokens(mut self) -> Self {
        self.token_expiration_minutes = -5;
        self
    }

    pub fn build(self) -> TestSetup {
        let user_repository = Arc::new(InMemoryUserRepository::new());
        let bookmark_repository = Arc::new(InMemoryBookmarkRepository::new());

        let state = AppState::new(
            user_repository.clone(),
            bookmark_repository.clone(),
            TokenConfig::new(TEST_SECRET, self.token_expiration_minutes),
        );

        TestSetup {
            app: build_router(state, Duration::from_secs(5)),
            user_repository,
            bookmark_repository,
        }
    }
}
