use serde::{Deserialize, Serialize};

use super::flashcard::FlashCard;

/// Body of `POST /quiz`. Omitting `num_questions` asks the server how many cards are available.
#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
    pub subject_id: i32,
    pub num_questions: Option<usize>,
}

/// A question as shown to the player; the definition is withheld
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestion {
    pub flashcard_id: i32,
    pub card: String,
}

impl From<FlashCard> for QuizQuestion {
    fn from(card: FlashCard) -> Self {
        QuizQuestion {
            flashcard_id: card.id,
            card: card.card,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartQuizResponse {
    NeedsCount {
        subject_id: i32,
        max_questions: usize,
    },
    Ready {
        subject_id: i32,
        questions: Vec<QuizQuestion>,
    },
}

#[derive(Debug, Deserialize)]
pub struct AnswerSubmission {
    pub flashcard_id: i32,
    pub answer: String,
}

/// Body of `POST /quiz/submit`
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub subject_id: i32,
    pub answers: Vec<AnswerSubmission>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizResult {
    pub flashcard_id: i32,
    pub question: String,
    pub actual_answer: String,
    pub user_answer: String,
    pub score: f32,
    pub is_correct: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizReport {
    pub subject_id: i32,
    pub results: Vec<QuizResult>,
    pub correct_count: usize,
    pub total: usize,
}

impl QuizReport {
    pub fn new(subject_id: i32, results: Vec<QuizResult>, total: usize) -> Self {
        let correct_count = results.iter().filter(|r| r.is_correct).count();
        QuizReport {
            subject_id,
            results,
            correct_count,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_quiz_request_without_count() {
        let request: StartQuizRequest = serde_json::from_str(r#"{"subject_id":3}"#)
            .expect("Failed to deserialize StartQuizRequest");
        assert_eq!(request.subject_id, 3);
        assert_eq!(request.num_questions, None);
    }

    #[test]
    fn test_start_quiz_response_is_tagged() {
        let needs_count = StartQuizResponse::NeedsCount { subject_id: 1, max_questions: 4 };
        assert_eq!(
            serde_json::to_string(&needs_count).unwrap(),
            r#"{"status":"needs_count","subject_id":1,"max_questions":4}"#
        );

        let ready = StartQuizResponse::Ready {
            subject_id: 1,
            questions: vec![QuizQuestion { flashcard_id: 9, card: "Mitosis".to_string() }],
        };
        assert_eq!(
            serde_json::to_string(&ready).unwrap(),
            r#"{"status":"ready","subject_id":1,"questions":[{"flashcard_id":9,"card":"Mitosis"}]}"#
        );
    }

    #[test]
    fn test_report_counts_correct_answers() {
        let result = |id: i32, is_correct: bool| QuizResult {
            flashcard_id: id,
            question: "q".to_string(),
            actual_answer: "a".to_string(),
            user_answer: "a".to_string(),
            score: if is_correct { 0.9 } else { 0.1 },
            is_correct,
        };

        let report = QuizReport::new(1, vec![result(1, true), result(2, false), result(3, true)], 4);
        assert_eq!(report.correct_count, 2);
        assert_eq!(report.total, 4);
    }
}
