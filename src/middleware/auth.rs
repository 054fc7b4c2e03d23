use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Header the frontend sends the session token in
pub const SESSION_HEADER: &str = "x-access-token";

/// The user resolved from a verified session token
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Session guard: verifies the token and injects [`CurrentUser`] into request extensions
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await?;
    tracing::debug!("Session accepted for user {} ({})", user.id, user.role);

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Role guard: must be layered inside [`require_session`]
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Token is missing"))?;
    ensure_admin(&current.0)?;

    Ok(next.run(request).await)
}

/// Resolve the session token in `headers` to a stored user
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = extract_token(headers).ok_or_else(|| ApiError::unauthorized("Token is missing"))?;
    let claims = state.sessions.verify(&token)?;

    match state.users.find_by_id(claims.user_id).await? {
        Some(user) => Ok(user),
        None => {
            tracing::warn!("Session token for unknown user {}", claims.user_id);
            Err(ApiError::unauthorized("User not found"))
        }
    }
}

pub fn ensure_admin(user: &User) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        tracing::debug!("Admin role required; user {} is {}", user.id, user.role);
        Err(ApiError::forbidden("Admin role required"))
    }
}

/// `x-access-token` first, then `Authorization: Bearer <token>`
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let direct = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = direct {
        return Some(token.to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
