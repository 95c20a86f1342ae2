use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A (card, definition) pair belonging to exactly one subject
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlashCard {
    pub id: i32,
    pub subject_id: i32,
    pub card: String,
    pub definition: String,
    pub created_at: DateTime<Utc>,
}

/// Request structure for adding a flashcard to a subject
#[derive(Debug, Deserialize)]
pub struct CreateFlashCardRequest {
    pub card: String,
    pub definition: String,
}

/// Request structure for editing a flashcard; omitted fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateFlashCardRequest {
    pub card: Option<String>,
    pub definition: Option<String>,
}

fn validate_card(card: &str) -> Result<(), String> {
    if card.trim().is_empty() {
        return Err("Card cannot be empty".to_string());
    }

    if card.trim().chars().count() > 500 {
        return Err("Card cannot exceed 500 characters".to_string());
    }

    Ok(())
}

fn validate_definition(definition: &str) -> Result<(), String> {
    if definition.trim().is_empty() {
        return Err("Definition cannot be empty".to_string());
    }

    if definition.trim().chars().count() > 2000 {
        return Err("Definition cannot exceed 2000 characters".to_string());
    }

    Ok(())
}

impl CreateFlashCardRequest {
    /// Validate the create flashcard request
    pub fn validate(&self) -> Result<(), String> {
        validate_card(&self.card)?;
        validate_definition(&self.definition)
    }

    pub fn get_normalized_card(&self) -> String {
        self.card.trim().to_string()
    }

    pub fn get_normalized_definition(&self) -> String {
        self.definition.trim().to_string()
    }
}

impl UpdateFlashCardRequest {
    /// At least one field must be present, and present fields follow the create rules
    pub fn validate(&self) -> Result<(), String> {
        if self.card.is_none() && self.definition.is_none() {
            return Err("At least one field (card or definition) must be provided for update".to_string());
        }

        if let Some(ref card) = self.card {
            validate_card(card)?;
        }

        if let Some(ref definition) = self.definition {
            validate_definition(definition)?;
        }

        Ok(())
    }

    pub fn get_normalized_card(&self) -> Option<String> {
        self.card.as_ref().map(|c| c.trim().to_string())
    }

    pub fn get_normalized_definition(&self) -> Option<String> {
        self.definition.as_ref().map(|d| d.trim().to_string())
    }
}
