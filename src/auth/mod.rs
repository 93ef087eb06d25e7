// Public API - what other modules can use
pub use handlers::{sign_in, sign_up};
pub use middleware::jwt_auth;
pub use token::TokenConfig;
pub use types::{AuthRequest, TokenClaims, TokenResponse};

// Internal modules
mod handlers;
mod middleware;
pub mod password;
pub mod service;
mod token;
mod types;
