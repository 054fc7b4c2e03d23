// handlers/elevated/users/create.rs - POST /api/users handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;

use super::parse_role;
use crate::database::models::{Role, UserView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::NewUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub google_id: Option<String>,
}

/**
 * POST /api/users - Create a user
 *
 * Input: `{"email", "name", "password"?, "role"? = "User", "google_id"?}`.
 * A password, when given, must be at least 6 characters. Accounts without a
 * password can only sign in through Google.
 *
 * Output: the created user, 201.
 */
pub async fn user_create(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<UserView> {
    let Json(request) = payload?;

    let (email, name) = match (request.email, request.name) {
        (Some(email), Some(name)) if !email.is_empty() && !name.is_empty() => (email, name),
        _ => return Err(ApiError::bad_request("Missing email or name")),
    };
    let role = match request.role.as_deref() {
        Some(role) => parse_role(role)?,
        None => Role::User,
    };

    let user = state
        .users
        .create(NewUser {
            email,
            name,
            password: request.password,
            role,
            google_id: request.google_id,
        })
        .await?;

    tracing::info!("User {} created by admin {}", user.id, admin.id);
    Ok(ApiResponse::created(UserView::from(user)))
}
