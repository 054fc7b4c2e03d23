// handlers/elevated/users/delete.rs - DELETE /api/users/:id handler

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Extension,
};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// Delete a user. The last remaining Admin cannot be deleted.
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Value> {
    let Path(user_id) = path?;
    state.users.delete(user_id, admin.id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
