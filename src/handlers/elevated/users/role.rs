// handlers/elevated/users/role.rs - PUT /api/users/:id/role handler

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Deserialize;

use super::parse_role;
use crate::database::models::UserView;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DirectoryError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Option<String>,
}

/// Change a user's role. Demoting the last Admin is refused.
pub async fn user_role_put(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> ApiResult<UserView> {
    let Path(user_id) = path?;
    let Json(request) = payload?;

    let role = match request.role.as_deref() {
        Some(role) => parse_role(role)?,
        None => return Err(DirectoryError::InvalidRole(String::new()).into()),
    };

    let user = state.users.set_role(user_id, role).await?;
    Ok(ApiResponse::success(UserView::from(user)))
}
