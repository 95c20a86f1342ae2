// Subject handlers
// HTTP handlers for subject management and CSV export

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{
    auth::CurrentUser,
    error::ApiError,
    export::{export_file_name, flashcards_to_csv, CSV_CONTENT_TYPE},
    models::{Subject, SubjectDetail, SubjectRequest, UserResponse},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: UserResponse,
    pub subjects: Vec<Subject>,
}

/// Current user and their subjects
/// GET /dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let subjects = state.store.list_subjects(current.id()).await?;

    Ok((
        StatusCode::OK,
        Json(Dashboard {
            user: UserResponse::from(current.0),
            subjects,
        }),
    ))
}

/// GET /subjects
pub async fn list_subjects(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let subjects = state.store.list_subjects(current.id()).await?;

    info!("Retrieved {} subjects for user_id: {}", subjects.len(), current.id());
    Ok((StatusCode::OK, Json(subjects)))
}

/// POST /subjects
pub async fn create_subject(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<SubjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate().map_err(ApiError::Validation)?;

    info!("Creating subject for user_id: {}", current.id());
    let subject = state.store.create_subject(current.id(), &request.get_normalized_name()).await?;

    Ok((StatusCode::CREATED, Json(subject)))
}

/// Subject with all of its flashcards
/// GET /subjects/:id
pub async fn get_subject(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(subject_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let subject = state.store.get_subject(current.id(), subject_id).await?;
    let flashcards = state.store.list_flashcards(current.id(), subject_id).await?;

    Ok((StatusCode::OK, Json(SubjectDetail { subject, flashcards })))
}

/// PUT /subjects/:id
pub async fn rename_subject(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(subject_id): Path<i32>,
    Json(request): Json<SubjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate().map_err(ApiError::Validation)?;

    let subject = state
        .store
        .rename_subject(current.id(), subject_id, &request.get_normalized_name())
        .await?;

    info!("Renamed subject with id: {}", subject_id);
    Ok((StatusCode::OK, Json(subject)))
}

/// Delete a subject together with its flashcards
/// DELETE /subjects/:id
pub async fn delete_subject(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(subject_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Deleting subject with id: {}", subject_id);

    let removed = state.store.delete_subject(current.id(), subject_id).await?;

    info!("Successfully deleted subject with id: {} ({} flashcards removed)", subject_id, removed);
    Ok(StatusCode::NO_CONTENT)
}

/// Download every flashcard of a subject as CSV
/// GET /subjects/:id/export
pub async fn export_subject(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(subject_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let subject = state.store.get_subject(current.id(), subject_id).await?;
    let flashcards = state.store.list_flashcards(current.id(), subject_id).await?;

    if flashcards.is_empty() {
        return Err(ApiError::not_found("No flashcards found for this subject."));
    }

    let body = flashcards_to_csv(&flashcards)?;
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(&subject.name));

    info!("Exported {} flashcards for subject_id: {}", flashcards.len(), subject_id);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
