// handlers/public/auth/mod.rs - Token acquisition

use serde::Serialize;

use crate::database::models::{Role, User};

pub mod google_login;
pub mod login;

pub use google_login::google_login_post;
pub use login::login_post;

/// Body returned by both login flows
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub name: String,
    pub role: Role,
    #[serde(rename = "apiToken")]
    pub api_token: String,
}

impl SessionResponse {
    pub fn new(user: &User, api_token: String) -> Self {
        Self {
            name: user.name.clone(),
            role: user.role,
            api_token,
        }
    }
}
