// handlers/protected/drive_token.rs - POST /api/save_drive_token handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DriveTokenRequest {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Store the caller's Drive tokens. An absent refresh token keeps the stored one.
pub async fn drive_token_post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<DriveTokenRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(request) = payload?;
    let access_token = request
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing access token"))?;
    let refresh_token = request.refresh_token.filter(|token| !token.is_empty());

    state
        .users
        .save_integration_tokens(user.id, &access_token, refresh_token.as_deref())
        .await?;

    tracing::info!(
        "Saved Drive token for user {} (refresh token provided: {})",
        user.id,
        refresh_token.is_some()
    );
    Ok(ApiResponse::message("Drive token saved successfully"))
}
