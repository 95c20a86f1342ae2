// Library root for the flashcard quiz service

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod grader;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod quiz;
pub mod routes;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use db::Database;
pub use error::ApiError;
pub use grader::{Grade, Grader, SIMILARITY_THRESHOLD};
pub use models::{FlashCard, Subject, User};
pub use routes::create_router;
pub use state::AppState;
pub use store::{MemoryStore, Store};
