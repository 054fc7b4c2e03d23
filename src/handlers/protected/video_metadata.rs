// handlers/protected/video_metadata.rs - POST /api/video-metadata handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadataRequest {
    pub file_id: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VideoMetadataResponse {
    pub creation_time: Option<String>,
}

/**
 * POST /api/video-metadata - Read the creation time of a Drive video
 *
 * Input: `{"fileId": "...", "accessToken": "..."}`. The file is downloaded with
 * the caller's Drive token, probed, and discarded. A file without the tag
 * returns `{"creation_time": null}`.
 */
pub async fn video_metadata_post(
    State(state): State<AppState>,
    payload: Result<Json<VideoMetadataRequest>, JsonRejection>,
) -> ApiResult<VideoMetadataResponse> {
    let Json(request) = payload?;
    let (file_id, access_token) = match (request.file_id, request.access_token) {
        (Some(file_id), Some(access_token)) if !file_id.is_empty() && !access_token.is_empty() => {
            (file_id, access_token)
        }
        _ => return Err(ApiError::bad_request("Missing fileId or accessToken")),
    };

    let creation_time = state.media.creation_time(&file_id, &access_token).await?;
    Ok(ApiResponse::success(VideoMetadataResponse { creation_time }))
}
