//! Password hashing and the `user_id` session cookie.
//!
//! Passwords are stored as Argon2id PHC strings. The session is a plain,
//! unsigned cookie carrying the numeric user id.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "user_id";

/// Hash a password using Argon2id with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        .context("Password hashing failed")?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored PHC hash. A mismatch is `Ok(false)`;
/// only a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))
        .context("Failed to parse password hash")?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e)),
    }
}

/// `Set-Cookie` value that starts a session for `user_id`.
pub fn session_cookie(user_id: i32) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, user_id)
}

/// `Set-Cookie` value that ends the session.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Reads the user id from the `Cookie` header, if present and numeric.
pub fn session_user_id(headers: &HeaderMap) -> Option<i32> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            if name == SESSION_COOKIE {
                value.trim().parse::<i32>().ok()
            } else {
                None
            }
        })
}

/// The logged-in user, resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = session_user_id(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Not authenticated."))?;

        match state.store.get_user_by_id(user_id).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(ApiError::NotFound(_)) => Err(ApiError::unauthorized("Not authenticated.")),
            Err(e) => Err(e),
        }
    }
}
