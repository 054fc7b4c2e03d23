// handlers/protected/schedules/recurring.rs - /api/recurring-schedules handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde_json::Value;

use crate::database::models::{RecurringSchedule, RecurringScheduleDraft};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/recurring-schedules
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<RecurringSchedule>> {
    Ok(ApiResponse::success(state.recurring.list().await?))
}

/// POST /api/recurring-schedules
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<RecurringScheduleDraft>, JsonRejection>,
) -> ApiResult<RecurringSchedule> {
    let Json(draft) = payload?;
    let schedule = state.recurring.create(draft).await?;
    tracing::info!("Created recurring schedule {} for {}", schedule.id, schedule.school_name);
    Ok(ApiResponse::created(schedule))
}

/// PUT /api/recurring-schedules/:id - replaces every field
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RecurringScheduleDraft>, JsonRejection>,
) -> ApiResult<RecurringSchedule> {
    let Path(id) = path?;
    let Json(draft) = payload?;
    Ok(ApiResponse::success(state.recurring.update(id, draft).await?))
}

/// DELETE /api/recurring-schedules/:id
pub async fn delete(State(state): State<AppState>, path: Result<Path<i64>, PathRejection>) -> ApiResult<Value> {
    let Path(id) = path?;
    state.recurring.delete(id).await?;
    tracing::info!("Deleted recurring schedule {}", id);
    Ok(ApiResponse::message("Schedule deleted"))
}
