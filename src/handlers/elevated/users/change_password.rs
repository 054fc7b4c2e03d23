// handlers/elevated/users/change_password.rs - POST /api/users/change-password handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: Option<String>,
}

/// Change the calling admin's own password
pub async fn change_password_post(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(request) = payload?;
    let new_password = request.new_password.unwrap_or_default();

    state.users.set_password(admin.id, &new_password).await?;
    Ok(ApiResponse::message("Password updated successfully"))
}
