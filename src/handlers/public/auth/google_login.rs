// handlers/public/auth/google_login.rs - POST /api/auth/google-login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use super::SessionResponse;
use crate::auth::VerificationError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: Option<String>,
}

/**
 * POST /api/auth/google-login - Exchange a Google ID token for a session token
 *
 * The token audience must match the `client_id` stored in settings. A first
 * login creates a `User`-role account; a login with a known email links the
 * Google id to that account.
 */
pub async fn google_login_post(
    State(state): State<AppState>,
    payload: Result<Json<GoogleLoginRequest>, JsonRejection>,
) -> ApiResult<SessionResponse> {
    let Json(request) = payload?;
    let token = request
        .token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::bad_request("Token is missing"))?;

    let settings = state.settings.get().await?;
    let client_id = settings.configured_client_id().ok_or(VerificationError::Unconfigured)?;

    let claim = state.identity.verify(&token, client_id).await?;
    let name = claim.name.clone().unwrap_or_else(|| claim.email.clone());

    let user = state
        .users
        .upsert_from_identity_provider(&claim.subject, &claim.email, &name)
        .await?;

    let api_token = state.sessions.issue(user.id)?;
    tracing::info!("User {} logged in with Google", user.id);
    Ok(ApiResponse::success(SessionResponse::new(&user, api_token)))
}
