// Flashcard handlers
// HTTP handlers for flashcard management operations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    auth::CurrentUser,
    error::ApiError,
    models::{CreateFlashCardRequest, UpdateFlashCardRequest},
    state::AppState,
};

/// GET /subjects/:id/flashcards
pub async fn list_flashcards(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(subject_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let flashcards = state.store.list_flashcards(current.id(), subject_id).await?;

    info!("Retrieved {} flashcards for subject_id: {}", flashcards.len(), subject_id);
    Ok((StatusCode::OK, Json(flashcards)))
}

/// Add a flashcard to one of the user's subjects
/// POST /subjects/:id/flashcards
pub async fn create_flashcard(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(subject_id): Path<i32>,
    Json(request): Json<CreateFlashCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate().map_err(ApiError::Validation)?;

    info!("Creating flashcard for subject_id: {}", subject_id);
    let flashcard = state
        .store
        .create_flashcard(
            current.id(),
            subject_id,
            &request.get_normalized_card(),
            &request.get_normalized_definition(),
        )
        .await?;

    info!("Successfully created flashcard with id: {}", flashcard.id);
    Ok((StatusCode::CREATED, Json(flashcard)))
}

/// GET /flashcards/:id
pub async fn get_flashcard(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(flashcard_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let flashcard = state.store.get_flashcard(current.id(), flashcard_id).await?;
    Ok((StatusCode::OK, Json(flashcard)))
}

/// PUT /flashcards/:id
pub async fn update_flashcard(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(flashcard_id): Path<i32>,
    Json(request): Json<UpdateFlashCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate().map_err(ApiError::Validation)?;

    let card = request.get_normalized_card();
    let definition = request.get_normalized_definition();

    let flashcard = state
        .store
        .update_flashcard(current.id(), flashcard_id, card.as_deref(), definition.as_deref())
        .await?;

    info!("Successfully updated flashcard with id: {}", flashcard_id);
    Ok((StatusCode::OK, Json(flashcard)))
}

/// DELETE /flashcards/:id
pub async fn delete_flashcard(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(flashcard_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let flashcard = state.store.delete_flashcard(current.id(), flashcard_id).await?;

    info!("Deleted flashcard with id: {} from subject_id: {}", flashcard.id, flashcard.subject_id);
    Ok(StatusCode::NO_CONTENT)
}
