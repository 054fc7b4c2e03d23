// handlers/protected/mod.rs - Handlers behind require_session
//
// Every handler here may extract `Extension<CurrentUser>`.

pub mod drive_token;
pub mod schedules;
pub mod video_metadata;

pub use drive_token::drive_token_post;
pub use video_metadata::video_metadata_post;
