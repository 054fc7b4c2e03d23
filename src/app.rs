use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::database::DatabaseManager;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_admin, require_session};
use crate::state::AppState;

/// Build the full HTTP surface over `state`
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let body_limit = state.config.server.max_request_size_bytes;

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Session required
        .merge(protected_routes(state.clone()))
        // Session + Admin required
        .merge(elevated_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{auth, settings};

    Router::new()
        .route("/api/auth/login", post(auth::login_post))
        .route("/api/auth/google-login", post(auth::google_login_post))
        // POST checks session and role inside the handler
        .route("/api/settings", get(settings::settings_get).post(settings::settings_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::schedules::{one_off, recurring};

    Router::new()
        .route("/api/save_drive_token", post(protected::drive_token_post))
        .route("/api/recurring-schedules", get(recurring::list).post(recurring::create))
        .route(
            "/api/recurring-schedules/:id",
            put(recurring::update).delete(recurring::delete),
        )
        .route("/api/one-off-schedules", get(one_off::list).post(one_off::create))
        .route("/api/one-off-schedules/:id", put(one_off::update).delete(one_off::delete))
        .route("/api/video-metadata", post(protected::video_metadata_post))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    use elevated::users;

    // Layers run outermost-last: the session guard wraps the role guard
    Router::new()
        .route("/api/users", get(users::user_list).post(users::user_create))
        .route("/api/users/change-password", post(users::change_password_post))
        .route("/api/users/:id", delete(users::user_delete))
        .route("/api/users/:id/role", put(users::user_role_put))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Schedule Admin API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth/login, /api/auth/google-login (public)",
            "settings": "/api/settings (GET public, POST admin)",
            "schedules": "/api/recurring-schedules[/:id], /api/one-off-schedules[/:id] (session)",
            "drive": "/api/save_drive_token, /api/video-metadata (session)",
            "users": "/api/users[/:id[/role]], /api/users/change-password (admin)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable",
                    "code": "SERVICE_UNAVAILABLE"
                })),
            )
        }
    }
}
