// handlers/protected/schedules/one_off.rs - /api/one-off-schedules handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde_json::Value;

use crate::database::models::{OneOffSchedule, OneOffScheduleDraft};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<OneOffSchedule>> {
    Ok(ApiResponse::success(state.one_off.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<OneOffScheduleDraft>, JsonRejection>,
) -> ApiResult<OneOffSchedule> {
    let Json(draft) = payload?;
    let schedule = state.one_off.create(draft).await?;
    tracing::info!("Created one-off schedule {} on {}", schedule.id, schedule.date);
    Ok(ApiResponse::created(schedule))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OneOffScheduleDraft>, JsonRejection>,
) -> ApiResult<OneOffSchedule> {
    let Path(id) = path?;
    let Json(draft) = payload?;
    Ok(ApiResponse::success(state.one_off.update(id, draft).await?))
}

pub async fn delete(State(state): State<AppState>, path: Result<Path<i64>, PathRejection>) -> ApiResult<Value> {
    let Path(id) = path?;
    state.one_off.delete(id).await?;
    tracing::info!("Deleted one-off schedule {}", id);
    Ok(ApiResponse::message("Schedule deleted"))
}
