use serde::{Deserialize, Serialize};
use validator::Validate;

/// JWT claims identifying the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub sub: i32, // User id
    pub email: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Credentials for both sign-up and sign-in
#[derive(Debug, Deserialize, Validate)]
pub struct AuthRequest {
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
}

/// Response body for both auth endpoints
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
}
