use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The singleton settings row
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct Settings {
    pub client_id: Option<String>,
    pub api_key: Option<String>,
    pub source_folder_id: Option<String>,
}

impl Settings {
    /// Client id for identity-provider verification, if one is configured
    pub fn configured_client_id(&self) -> Option<&str> {
        self.client_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

/// Wire shape: absent values are rendered as empty strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsView {
    pub client_id: String,
    pub api_key: String,
    pub source_folder_id: String,
}

impl From<Settings> for SettingsView {
    fn from(settings: Settings) -> Self {
        Self {
            client_id: settings.client_id.unwrap_or_default(),
            api_key: settings.api_key.unwrap_or_default(),
            source_folder_id: settings.source_folder_id.unwrap_or_default(),
        }
    }
}
