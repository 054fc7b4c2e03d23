pub mod auth;
pub mod response;

pub use auth::{authenticate, ensure_admin, require_admin, require_session, CurrentUser, SESSION_HEADER};
pub use response::{ApiResponse, ApiResult};
