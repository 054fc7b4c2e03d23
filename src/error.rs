// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::identity::VerificationError;
use crate::auth::password::PasswordError;
use crate::auth::session::SessionError;
use crate::database::manager::DatabaseError;
use crate::services::media_probe::MediaError;
use crate::services::schedule_repository::ScheduleError;
use crate::services::user_directory::DirectoryError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),
    WeakPassword(String),
    InvalidRole(String),
    LastAdminProtected(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error (store or outbound-call failure)
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::WeakPassword(_) => 400,
            ApiError::InvalidRole(_) => 400,
            ApiError::LastAdminProtected(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::WeakPassword(msg) => msg,
            ApiError::InvalidRole(msg) => msg,
            ApiError::LastAdminProtected(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body. The frontend reads the `error` key as the display message.
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError { field_errors: Some(field_errors), .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::WeakPassword(_) => "WEAK_PASSWORD",
            ApiError::InvalidRole(_) => "INVALID_ROLE",
            ApiError::LastAdminProtected(_) => "LAST_ADMIN_PROTECTED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    /// Validation failure for a single named request field.
    pub fn missing_field(field: &str) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), "This field is required".to_string());
        ApiError::validation_error(format!("Missing required field: {}", field), Some(field_errors))
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl(_) => {
                tracing::error!("Database configuration error: {}", err);
                ApiError::service_unavailable("Database is not configured")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            DatabaseError::Migration(msg) => {
                tracing::error!("Migration error: {}", msg);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        DatabaseError::Sqlx(err).into()
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateEmail(_) => ApiError::conflict("Email already exists"),
            DirectoryError::WeakPassword => ApiError::WeakPassword(err.to_string()),
            DirectoryError::InvalidRole(_) => ApiError::InvalidRole("Invalid role specified".to_string()),
            DirectoryError::LastAdminProtected => ApiError::LastAdminProtected(err.to_string()),
            DirectoryError::NotFound(_) => ApiError::not_found("User not found"),
            DirectoryError::Password(inner) => inner.into(),
            DirectoryError::Store(sqlx_err) => sqlx_err.into(),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::internal_server_error("Could not process password")
    }
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::MissingField(field) => ApiError::missing_field(field),
            ScheduleError::NotFound(_) => ApiError::not_found("Schedule not found"),
            ScheduleError::Store(sqlx_err) => sqlx_err.into(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Expired => ApiError::unauthorized("Token has expired"),
            SessionError::Malformed(_) => ApiError::unauthorized("Token is invalid"),
            SessionError::Signing(msg) => {
                tracing::error!("Session token signing failed: {}", msg);
                ApiError::internal_server_error("Could not issue session token")
            }
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::Unconfigured => {
                ApiError::internal_server_error("Google Client ID is not configured on the server")
            }
            VerificationError::Invalid(reason) => {
                tracing::warn!("Identity token rejected: {}", reason);
                ApiError::unauthorized("Invalid Google token or Client ID mismatch")
            }
            VerificationError::Unavailable(reason) => {
                tracing::error!("Identity provider unavailable: {}", reason);
                ApiError::internal_server_error("Could not reach the identity provider")
            }
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        tracing::error!("Video metadata extraction failed: {}", err);
        ApiError::internal_server_error(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
