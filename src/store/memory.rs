//! In-memory store
//!
//! Keeps every table in an ordered map behind one `tokio::sync::RwLock`.
//! Ids are handed out from per-table counters starting at 1, like `SERIAL`
//! columns, so ordering by id is creation order.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use super::{flashcard_not_found, subject_not_found, user_not_found, username_taken, Store};
use crate::error::ApiError;
use crate::models::{FlashCard, Subject, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    subjects: BTreeMap<i32, Subject>,
    flashcards: BTreeMap<i32, FlashCard>,
    next_user_id: i32,
    next_subject_id: i32,
    next_flashcard_id: i32,
}

impl Tables {
    fn owned_subject(&self, user_id: i32, subject_id: i32) -> Result<&Subject, ApiError> {
        self.subjects
            .get(&subject_id)
            .filter(|subject| subject.user_id == user_id)
            .ok_or_else(subject_not_found)
    }

    fn owned_flashcard_id(&self, user_id: i32, flashcard_id: i32) -> Result<i32, ApiError> {
        let flashcard = self.flashcards.get(&flashcard_id).ok_or_else(flashcard_not_found)?;
        self.owned_subject(user_id, flashcard.subject_id)
            .map_err(|_| flashcard_not_found())?;
        Ok(flashcard_id)
    }

    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, ApiError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|user| user.username == username) {
            return Err(username_taken());
        }

        let user = User {
            id: Tables::next_id(&mut tables.next_user_id),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());

        info!("Created user with id: {}", user.id);
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: i32) -> Result<User, ApiError> {
        let tables = self.tables.read().await;
        tables.users.get(&user_id).cloned().ok_or_else(|| user_not_found(user_id))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|user| user.username == username).cloned())
    }

    async fn create_subject(&self, user_id: i32, name: &str) -> Result<Subject, ApiError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&user_id) {
            return Err(ApiError::validation("Referenced resource does not exist"));
        }

        let subject = Subject {
            id: Tables::next_id(&mut tables.next_subject_id),
            user_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        tables.subjects.insert(subject.id, subject.clone());

        info!("Created subject with id: {}", subject.id);
        Ok(subject)
    }

    async fn list_subjects(&self, user_id: i32) -> Result<Vec<Subject>, ApiError> {
        let tables = self.tables.read().await;
        Ok(tables
            .subjects
            .values()
            .filter(|subject| subject.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_subject(&self, user_id: i32, subject_id: i32) -> Result<Subject, ApiError> {
        let tables = self.tables.read().await;
        tables.owned_subject(user_id, subject_id).cloned()
    }

    async fn rename_subject(&self, user_id: i32, subject_id: i32, name: &str) -> Result<Subject, ApiError> {
        let mut tables = self.tables.write().await;
        tables.owned_subject(user_id, subject_id)?;

        let subject = tables.subjects.get_mut(&subject_id).ok_or_else(subject_not_found)?;
        subject.name = name.to_string();

        Ok(subject.clone())
    }

    async fn delete_subject(&self, user_id: i32, subject_id: i32) -> Result<u64, ApiError> {
        let mut tables = self.tables.write().await;
        tables.owned_subject(user_id, subject_id)?;

        let before = tables.flashcards.len();
        tables.flashcards.retain(|_, flashcard| flashcard.subject_id != subject_id);
        let removed = (before - tables.flashcards.len()) as u64;
        tables.subjects.remove(&subject_id);

        info!("Deleted subject with id: {} (cascade deleted {} flashcards)", subject_id, removed);
        Ok(removed)
    }

    async fn create_flashcard(
        &self,
        user_id: i32,
        subject_id: i32,
        card: &str,
        definition: &str,
    ) -> Result<FlashCard, ApiError> {
        let mut tables = self.tables.write().await;
        tables.owned_subject(user_id, subject_id)?;

        let flashcard = FlashCard {
            id: Tables::next_id(&mut tables.next_flashcard_id),
            subject_id,
            card: card.to_string(),
            definition: definition.to_string(),
            created_at: Utc::now(),
        };
        tables.flashcards.insert(flashcard.id, flashcard.clone());

        info!("Created flashcard with id: {}", flashcard.id);
        Ok(flashcard)
    }

    async fn list_flashcards(&self, user_id: i32, subject_id: i32) -> Result<Vec<FlashCard>, ApiError> {
        let tables = self.tables.read().await;
        tables.owned_subject(user_id, subject_id)?;

        Ok(tables
            .flashcards
            .values()
            .filter(|flashcard| flashcard.subject_id == subject_id)
            .cloned()
            .collect())
    }

    async fn get_flashcard(&self, user_id: i32, flashcard_id: i32) -> Result<FlashCard, ApiError> {
        let tables = self.tables.read().await;
        let id = tables.owned_flashcard_id(user_id, flashcard_id)?;
        tables.flashcards.get(&id).cloned().ok_or_else(flashcard_not_found)
    }

    async fn update_flashcard(
        &self,
        user_id: i32,
        flashcard_id: i32,
        card: Option<&str>,
        definition: Option<&str>,
    ) -> Result<FlashCard, ApiError> {
        let mut tables = self.tables.write().await;
        let id = tables.owned_flashcard_id(user_id, flashcard_id)?;

        let flashcard = tables.flashcards.get_mut(&id).ok_or_else(flashcard_not_found)?;
        if let Some(card) = card {
            flashcard.card = card.to_string();
        }
        if let Some(definition) = definition {
            flashcard.definition = definition.to_string();
        }

        Ok(flashcard.clone())
    }

    async fn delete_flashcard(&self, user_id: i32, flashcard_id: i32) -> Result<FlashCard, ApiError> {
        let mut tables = self.tables.write().await;
        let id = tables.owned_flashcard_id(user_id, flashcard_id)?;
        tables.flashcards.remove(&id).ok_or_else(flashcard_not_found)
    }
}
