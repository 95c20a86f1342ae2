//! Quiz session building: picks the cards a quiz will ask about.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::error::ApiError;
use crate::models::FlashCard;

#[derive(Error, Debug, PartialEq)]
pub enum QuizError {
    #[error("No flashcards found for this subject.")]
    EmptySubject,

    #[error("Number of questions must be at least 1")]
    InvalidCount,
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::EmptySubject => ApiError::not_found(err.to_string()),
            QuizError::InvalidCount => ApiError::validation(err.to_string()),
        }
    }
}

/// What the quiz flow should do next.
#[derive(Debug, PartialEq)]
pub enum QuizPlan {
    /// No count was requested yet; ask the player, offering at most `max_questions`.
    NeedsCount { max_questions: usize },
    /// The sampled cards, without duplicates.
    Questions(Vec<FlashCard>),
}

/// Draws `min(requested, cards.len())` distinct cards uniformly at random.
pub fn build_quiz<R>(cards: Vec<FlashCard>, requested: Option<usize>, rng: &mut R) -> Result<QuizPlan, QuizError>
where
    R: Rng + ?Sized,
{
    if cards.is_empty() {
        return Err(QuizError::EmptySubject);
    }

    let requested = match requested {
        None => {
            return Ok(QuizPlan::NeedsCount {
                max_questions: cards.len(),
            })
        }
        Some(0) => return Err(QuizError::InvalidCount),
        Some(count) => count,
    };

    let count = requested.min(cards.len());
    let selected = cards.choose_multiple(rng, count).cloned().collect();

    Ok(QuizPlan::Questions(selected))
}
