use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

/// Status plus parsed JSON body (`Value::Null` for empty bodies)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Sends a request through the full router
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse { status, body }
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn sign_up(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/auth/signup",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/auth/signin",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Signs up and returns the access token, panicking if sign-up fails
    pub async fn signed_up_token(&self, email: &str, password: &str) -> String {
        let response = self.sign_up(email, password).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn create_bookmark(&self, token: &str, body: Value) -> TestResponse {
        self.send("POST", "/bookmarks", Some(token), Some(body)).await
    }

    pub async fn list_bookmarks(&self, token: &str) -> TestResponse {
        self.send("GET", "/bookmarks", Some(token), None).await
    }

    pub async fn get_bookmark(&self, token: &str, id: i64) -> TestResponse {
        self.send("GET", &format!("/bookmarks/{}", id), Some(token), None)
            .await
    }

    pub async fn edit_bookmark(&self, token: &str, id: i64, body: Value) -> TestResponse {
        self.send("PATCH", &format!("/bookmarks/{}", id), Some(token), Some(body))
            .await
    }

    pub async fn delete_bookmark(&self, token: &str, id: i64) -> TestResponse {
        self.send("DELETE", &format!("/bookmarks/{}", id), Some(token), None)
            .await
    }
}
