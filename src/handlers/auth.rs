// Auth handlers
// Signup, login and logout over the user_id cookie

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};

use crate::{
    auth::{clear_session_cookie, hash_password, session_cookie, verify_password},
    error::ApiError,
    models::{Credentials, UserResponse},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Register a new account
/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate().map_err(ApiError::Validation)?;
    let username = request.get_normalized_username();

    info!("Creating new user with username: {}", username);

    // Checked up front so a taken name skips the expensive hash
    if state.store.find_user_by_username(&username).await?.is_some() {
        return Err(ApiError::conflict("Username already exists. Please choose another."));
    }

    let password_hash = hash_password(&request.password)?;
    let user = state.store.create_user(&username, &password_hash).await?;

    info!("Successfully created user with id: {}", user.id);
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Authenticate and start a session
/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let username = request.get_normalized_username();

    let user = state
        .store
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::validation(INVALID_CREDENTIALS))?;

    let verified = verify_password(&request.password, &user.password_hash).unwrap_or_else(|e| {
        warn!("Stored password hash for user {} is unreadable: {:#}", user.id, e);
        false
    });
    if !verified {
        return Err(ApiError::validation(INVALID_CREDENTIALS));
    }

    info!("User {} logged in", user.id);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(user.id))],
        Json(UserResponse::from(user)),
    ))
}

/// End the session
/// GET|POST /logout
pub async fn logout() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, clear_session_cookie())])
}
