use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0} must be set outside development")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub integrations: IntegrationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub default_admin_email: String,
    pub default_admin_password: String,
}

// Keep secrets out of logs.
impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("default_admin_email", &self.default_admin_email)
            .field("default_admin_password", &"<redacted>")
            .finish()
    }
}

/// Endpoints and tools used by the outbound calls (identity oracle, Drive download, ffprobe).
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    pub google_tokeninfo_url: String,
    pub drive_download_url: String,
    pub ffprobe_path: String,
    pub outbound_timeout_secs: u64,
    pub media_temp_dir: PathBuf,
}

const DEVELOPMENT_SECRET: &str = "development-secret-change-me";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.validate()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("SCHEDULER_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = parse_var("PORT", &v)?;
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = parse_var("API_MAX_REQUEST_SIZE_BYTES", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.server.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // Security overrides
        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_var("SECURITY_JWT_EXPIRY_HOURS", &v)?;
        }
        if let Ok(v) = env::var("DEFAULT_ADMIN_EMAIL") {
            self.security.default_admin_email = v;
        }
        if let Ok(v) = env::var("DEFAULT_ADMIN_PASSWORD") {
            self.security.default_admin_password = v;
        }

        // Integration overrides
        if let Ok(v) = env::var("GOOGLE_TOKENINFO_URL") {
            self.integrations.google_tokeninfo_url = v;
        }
        if let Ok(v) = env::var("DRIVE_DOWNLOAD_URL") {
            self.integrations.drive_download_url = v;
        }
        if let Ok(v) = env::var("FFPROBE_PATH") {
            self.integrations.ffprobe_path = v;
        }
        if let Ok(v) = env::var("OUTBOUND_TIMEOUT_SECS") {
            self.integrations.outbound_timeout_secs = parse_var("OUTBOUND_TIMEOUT_SECS", &v)?;
        }
        if let Ok(v) = env::var("MEDIA_TEMP_DIR") {
            self.integrations.media_temp_dir = PathBuf::from(v);
        }

        Ok(self)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("SECRET_KEY"));
        }
        if self.environment != Environment::Development && self.security.jwt_secret == DEVELOPMENT_SECRET {
            return Err(ConfigError::Missing("SECRET_KEY"));
        }
        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5001,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                cors_origins: vec!["http://localhost:5173".to_string()],
            },
            database: DatabaseConfig {
                url: "sqlite://schedule.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_SECRET.to_string(),
                jwt_expiry_hours: 24,
                default_admin_email: "admin".to_string(),
                default_admin_password: "password".to_string(),
            },
            integrations: IntegrationConfig::defaults(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5001,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                cors_origins: vec!["http://localhost:5173".to_string()],
            },
            database: DatabaseConfig {
                url: "sqlite://schedule.db".to_string(),
                max_connections: 10,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                default_admin_email: "admin".to_string(),
                default_admin_password: "password".to_string(),
            },
            integrations: IntegrationConfig::defaults(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5001,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                cors_origins: vec!["https://teachersupportapp.onrender.com".to_string()],
            },
            database: DatabaseConfig {
                url: "sqlite://schedule.db".to_string(),
                max_connections: 10,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                default_admin_email: "admin".to_string(),
                default_admin_password: "password".to_string(),
            },
            integrations: IntegrationConfig::defaults(),
        }
    }

    /// Development settings pointed at an in-memory store. Used by tests and the CLI dry runs.
    pub fn in_memory() -> Self {
        let mut config = Self::development();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 1;
        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl IntegrationConfig {
    fn defaults() -> Self {
        Self {
            google_tokeninfo_url: "https://oauth2.googleapis.com/tokeninfo".to_string(),
            drive_download_url: "https://www.googleapis.com/drive/v3/files".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            outbound_timeout_secs: 60,
            media_temp_dir: env::temp_dir(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.security.jwt_expiry_hours, 24);
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.security.default_admin_email, "admin");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_secret() {
        let config = AppConfig::production();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("SECRET_KEY"))));

        let mut config = AppConfig::production();
        config.security.jwt_secret = DEVELOPMENT_SECRET.to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::production();
        config.security.jwt_secret = "a-real-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_var_reports_name() {
        let err = parse_var::<u16>("PORT", "not-a-port").unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert_eq!(parse_var::<u16>("PORT", " 8080 ").unwrap(), 8080);
    }

    #[test]
    fn test_security_debug_redacts_secret() {
        let config = AppConfig::development();
        let rendered = format!("{:?}", config.security);
        assert!(!rendered.contains(DEVELOPMENT_SECRET));
        assert!(rendered.contains("<redacted>"));
    }
}
