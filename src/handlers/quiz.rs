// Quiz handlers
// Two-step quiz flow: pick the questions, then grade the answers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, info};

use crate::{
    auth::CurrentUser,
    error::ApiError,
    models::{FlashCard, QuizQuestion, QuizReport, QuizResult, StartQuizRequest, StartQuizResponse, SubmitQuizRequest},
    quiz::{build_quiz, QuizPlan},
    state::AppState,
};

/// Start a quiz for one subject
/// POST /quiz
///
/// Without `num_questions` the response only reports how many cards are
/// available; the client asks again with a count.
pub async fn start_quiz(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<StartQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let subject_id = request.subject_id;
    let cards = state.store.list_flashcards(current.id(), subject_id).await?;

    let plan = build_quiz(cards, request.num_questions, &mut rand::thread_rng())?;

    let response = match plan {
        QuizPlan::NeedsCount { max_questions } => {
            info!("Asking for question count for subject_id: {} (max {})", subject_id, max_questions);
            StartQuizResponse::NeedsCount { subject_id, max_questions }
        }
        QuizPlan::Questions(cards) => {
            info!("Starting quiz with {} questions for subject_id: {}", cards.len(), subject_id);
            StartQuizResponse::Ready {
                subject_id,
                questions: cards.into_iter().map(QuizQuestion::from).collect(),
            }
        }
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Grade submitted answers
/// POST /quiz/submit
///
/// Answers naming a card that is missing or outside the quiz subject are
/// skipped, but still count towards `total`.
pub async fn submit_quiz(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let subject_id = request.subject_id;
    let total = request.answers.len();

    let mut graded: Vec<(FlashCard, String)> = Vec::with_capacity(total);
    for submission in request.answers {
        match state.store.get_flashcard(current.id(), submission.flashcard_id).await {
            Ok(card) if card.subject_id == subject_id => graded.push((card, submission.answer)),
            Ok(_) | Err(ApiError::NotFound(_)) => {
                debug!("Skipping answer for unknown flashcard {}", submission.flashcard_id);
            }
            Err(e) => return Err(e),
        }
    }

    // Embedding inference is CPU-bound, keep it off the async workers
    let grader = state.grader.clone();
    let results = tokio::task::spawn_blocking(move || {
        let grades = {
            let pairs: Vec<(&str, &str)> = graded
                .iter()
                .map(|(card, answer)| (answer.as_str(), card.definition.as_str()))
                .collect();
            grader.grade_all(&pairs)
        };

        graded
            .into_iter()
            .zip(grades)
            .map(|((card, user_answer), grade)| {
                QuizResult {
                    flashcard_id: card.id,
                    question: card.card,
                    actual_answer: card.definition,
                    user_answer,
                    score: grade.score,
                    is_correct: grade.correct,
                }
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("Grading task failed: {}", e)))?;

    let report = QuizReport::new(subject_id, results, total);

    info!(
        "Graded quiz for subject_id: {} ({}/{} correct)",
        subject_id, report.correct_count, report.total
    );
    Ok((StatusCode::OK, Json(report)))
}
