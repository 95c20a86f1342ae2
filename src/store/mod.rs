//! Persistence layer
//!
//! Users, subjects and flashcards live behind the [`Store`] trait. Two
//! backends implement it:
//! - PostgreSQL ([`crate::db::Database`]) for deployments
//! - in-process memory ([`MemoryStore`]) for local runs and tests
//!
//! Every subject and flashcard operation takes the requesting user's id.
//! Records owned by somebody else are reported as not found.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::StoreConfig;
use crate::db::Database;
use crate::error::ApiError;
use crate::models::{FlashCard, Subject, User};

pub use memory::MemoryStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Confirms the backend can serve requests
    async fn health_check(&self) -> Result<(), ApiError>;

    /// Fails with `Conflict` when the username is taken
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, ApiError>;

    async fn get_user_by_id(&self, user_id: i32) -> Result<User, ApiError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    async fn create_subject(&self, user_id: i32, name: &str) -> Result<Subject, ApiError>;

    /// Subjects of one user, oldest first
    async fn list_subjects(&self, user_id: i32) -> Result<Vec<Subject>, ApiError>;

    async fn get_subject(&self, user_id: i32, subject_id: i32) -> Result<Subject, ApiError>;

    async fn rename_subject(&self, user_id: i32, subject_id: i32, name: &str) -> Result<Subject, ApiError>;

    /// Deletes the subject and all of its flashcards, returning how many cards went with it
    async fn delete_subject(&self, user_id: i32, subject_id: i32) -> Result<u64, ApiError>;

    async fn create_flashcard(
        &self,
        user_id: i32,
        subject_id: i32,
        card: &str,
        definition: &str,
    ) -> Result<FlashCard, ApiError>;

    /// Cards of one subject, oldest first
    async fn list_flashcards(&self, user_id: i32, subject_id: i32) -> Result<Vec<FlashCard>, ApiError>;

    async fn get_flashcard(&self, user_id: i32, flashcard_id: i32) -> Result<FlashCard, ApiError>;

    /// `None` fields keep their current value
    async fn update_flashcard(
        &self,
        user_id: i32,
        flashcard_id: i32,
        card: Option<&str>,
        definition: Option<&str>,
    ) -> Result<FlashCard, ApiError>;

    /// Returns the card that was removed
    async fn delete_flashcard(&self, user_id: i32, flashcard_id: i32) -> Result<FlashCard, ApiError>;
}

pub(crate) fn subject_not_found() -> ApiError {
    ApiError::not_found("Subject not found.")
}

pub(crate) fn flashcard_not_found() -> ApiError {
    ApiError::not_found("Flashcard not found.")
}

pub(crate) fn user_not_found(user_id: i32) -> ApiError {
    ApiError::not_found(format!("User with id {} not found", user_id))
}

pub(crate) fn username_taken() -> ApiError {
    ApiError::conflict("Username already exists. Please choose another.")
}

/// Builds the configured backend. PostgreSQL is connected and migrated before it is returned.
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn Store>, ApiError> {
    match config {
        StoreConfig::Postgres(database_config) => {
            let database = Database::new(database_config.clone()).await?;
            database.migrate().await?;
            Ok(Arc::new(database))
        }
        StoreConfig::Memory => {
            info!("Using in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
