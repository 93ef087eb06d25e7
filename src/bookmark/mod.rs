// Public API - what other modules can use
pub use handlers::{create_bookmark, delete_bookmark, edit_bookmark, get_bookmark, list_bookmarks};
pub use models::BookmarkModel;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
