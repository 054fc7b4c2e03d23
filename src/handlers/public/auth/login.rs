// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use super::SessionResponse;
use crate::auth::password::verify_password_blocking;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

const BAD_CREDENTIALS: &str = "Invalid username or password";

/**
 * POST /api/auth/login - Password login for Admin accounts
 *
 * Input: `{"username": "admin", "password": "..."}`. The username is matched
 * case-insensitively against `<username>@local.admin`, then `<username>`.
 *
 * Output: `{"name", "role", "apiToken"}`. Unknown user and wrong password
 * produce the same 401 body.
 */
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<SessionResponse> {
    let Json(request) = payload?;

    let (username, password) = match (request.username, request.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => (username, password),
        _ => return Err(ApiError::bad_request("Missing username or password")),
    };

    let user = match state.users.find_admin_for_login(&username).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Login rejected: no admin account for '{}'", username);
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        }
    };

    let password_ok = match user.password_hash.clone() {
        Some(hash) => verify_password_blocking(hash, password).await?,
        None => false,
    };
    if !password_ok {
        tracing::warn!("Login rejected: wrong password for user {}", user.id);
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let token = state.sessions.issue(user.id)?;
    tracing::info!("User {} logged in with password", user.id);
    Ok(ApiResponse::success(SessionResponse::new(&user, token)))
}
