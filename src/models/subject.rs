use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use super::flashcard::FlashCard;

/// A named group of flashcards owned by one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subject {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Subject together with its cards, as shown on the subject page
#[derive(Debug, Clone, Serialize)]
pub struct SubjectDetail {
    #[serde(flatten)]
    pub subject: Subject,
    pub flashcards: Vec<FlashCard>,
}

/// Request body for creating or renaming a subject
#[derive(Debug, Deserialize)]
pub struct SubjectRequest {
    pub name: String,
}

impl SubjectRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Subject name cannot be empty".to_string());
        }

        if self.name.trim().chars().count() > 200 {
            return Err("Subject name cannot exceed 200 characters".to_string());
        }

        Ok(())
    }

    pub fn get_normalized_name(&self) -> String {
        self.name.trim().to_string()
    }
}
