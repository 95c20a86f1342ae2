use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    config::HttpConfig,
    handlers::{auth, flashcards, health_check, quiz, subjects},
    middleware::create_middleware_stack,
    state::AppState,
};

/// Create the Axum router with all endpoints and middleware
pub fn create_router(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Account endpoints
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        // Subject endpoints
        .route("/dashboard", get(subjects::dashboard))
        .route("/subjects", get(subjects::list_subjects).post(subjects::create_subject))
        .route(
            "/subjects/:id",
            get(subjects::get_subject)
                .put(subjects::rename_subject)
                .delete(subjects::delete_subject),
        )
        .route("/subjects/:id/export", get(subjects::export_subject))
        // Flashcard endpoints
        .route(
            "/subjects/:id/flashcards",
            get(flashcards::list_flashcards).post(flashcards::create_flashcard),
        )
        .route(
            "/flashcards/:id",
            get(flashcards::get_flashcard)
                .put(flashcards::update_flashcard)
                .delete(flashcards::delete_flashcard),
        )
        // Quiz endpoints
        .route("/quiz", post(quiz::start_quiz))
        .route("/quiz/submit", post(quiz::submit_quiz))
        .with_state(state)
        .layer(create_middleware_stack(http))
}
