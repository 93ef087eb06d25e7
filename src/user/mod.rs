// Public API - what other modules can use
pub use handlers::{edit_user, get_me};
pub use models::UserModel;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
