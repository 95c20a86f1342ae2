// Models module

pub mod user;
pub mod subject;
pub mod flashcard;
pub mod quiz;

// Re-export commonly used types
pub use user::{User, Credentials, UserResponse};
pub use subject::{Subject, SubjectDetail, SubjectRequest};
pub use flashcard::{FlashCard, CreateFlashCardRequest, UpdateFlashCardRequest};
pub use quiz::{
    AnswerSubmission, QuizQuestion, QuizReport, QuizResult, StartQuizRequest, StartQuizResponse,
    SubmitQuizRequest,
};
