// handlers/public/settings.rs - GET/POST /api/settings handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::{Settings, SettingsView};
use crate::middleware::{authenticate, ensure_admin, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SettingsRequest {
    pub client_id: Option<String>,
    pub api_key: Option<String>,
    pub source_folder_id: Option<String>,
}

/// GET /api/settings - Public; absent values render as ""
pub async fn settings_get(State(state): State<AppState>) -> ApiResult<SettingsView> {
    let settings = state.settings.get().await?;
    Ok(ApiResponse::success(settings.into()))
}

/**
 * POST /api/settings - Replace all settings
 *
 * Not behind the route guards so that GET stays public; the session and Admin
 * role are checked here before the body is read. Fields left out are cleared.
 */
pub async fn settings_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SettingsRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let user = authenticate(&state, &headers).await?;
    ensure_admin(&user)?;

    let Json(request) = payload?;
    state
        .settings
        .set(&Settings {
            client_id: request.client_id,
            api_key: request.api_key,
            source_folder_id: request.source_folder_id,
        })
        .await?;

    tracing::info!("Settings saved by user {}", user.id);
    Ok(ApiResponse::message("Settings saved successfully"))
}
