// handlers/elevated/users/list.rs - GET /api/users handler

use axum::extract::State;

use crate::database::models::UserView;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// All users ordered by id. Password hashes and Drive tokens are never included.
pub async fn user_list(State(state): State<AppState>) -> ApiResult<Vec<UserView>> {
    let users = state.users.list().await?;
    Ok(ApiResponse::success(users.into_iter().map(UserView::from).collect()))
}
