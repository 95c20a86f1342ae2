// Handlers module
// HTTP handlers for the flashcard API

pub mod auth;
pub mod subjects;
pub mod flashcards;
pub mod quiz;

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{error::ApiError, state::AppState};

/// Health check handler
/// Returns "OK" with 200 status once the store answers
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.store.health_check().await?;
    Ok((StatusCode::OK, "OK"))
}
