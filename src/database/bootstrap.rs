use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::database::models::Role;
use crate::services::{DirectoryError, NewUser, SettingsStore, UserDirectory};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(
        "no Admin account exists and the default admin email '{0}' belongs to a non-admin user; \
         set DEFAULT_ADMIN_EMAIL to an unused address or promote that user"
    )]
    AdminEmailTaken(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

/// What [`ensure_defaults`] had to create
#[derive(Debug, Default, PartialEq)]
pub struct BootstrapReport {
    pub settings_created: bool,
    pub admin_created: bool,
}

/// Ensure a settings row and at least one Admin exist.
///
/// Runs after migration on every startup and is a no-op once both exist.
pub async fn ensure_defaults(pool: &SqlitePool, security: &SecurityConfig) -> Result<BootstrapReport, BootstrapError> {
    let mut report = BootstrapReport::default();

    report.settings_created = SettingsStore::new(pool.clone()).ensure_default().await?;
    if report.settings_created {
        info!("Created empty settings row");
    }

    let users = UserDirectory::new(pool.clone());
    if users.count_admins().await? > 0 {
        return Ok(report);
    }
    if users.find_by_email(&security.default_admin_email).await?.is_some() {
        return Err(BootstrapError::AdminEmailTaken(security.default_admin_email.clone()));
    }

    let admin = users
        .create(NewUser {
            email: security.default_admin_email.clone(),
            name: "Admin".to_string(),
            password: Some(security.default_admin_password.clone()),
            role: Role::Admin,
            google_id: None,
        })
        .await?;
    report.admin_created = true;

    warn!(
        "No admin account existed; created default admin '{}' (id {}). Change its password.",
        admin.email, admin.id
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::config::AppConfig;
    use crate::testing::memory_pool;

    #[tokio::test]
    async fn creates_defaults_once() {
        let pool = memory_pool().await;
        let security = AppConfig::in_memory().security;

        let first = ensure_defaults(&pool, &security).await.unwrap();
        assert_eq!(
            first,
            BootstrapReport {
                settings_created: true,
                admin_created: true
            }
        );
        let second = ensure_defaults(&pool, &security).await.unwrap();
        assert_eq!(second, BootstrapReport::default());

        let users = UserDirectory::new(pool);
        let admin = users.find_admin_for_login("admin").await.unwrap().unwrap();
        assert_eq!(admin.name, "Admin");
        assert!(verify_password(admin.password_hash.as_deref().unwrap(), "password"));
    }

    #[tokio::test]
    async fn default_email_held_by_plain_user_is_reported() {
        let pool = memory_pool().await;
        let security = AppConfig::in_memory().security;
        let users = UserDirectory::new(pool.clone());
        users
            .create(NewUser {
                email: security.default_admin_email.clone(),
                name: "Not an admin".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = ensure_defaults(&pool, &security).await.unwrap_err();
        assert!(matches!(err, BootstrapError::AdminEmailTaken(ref email) if *email == security.default_admin_email));
        assert!(err.to_string().contains("DEFAULT_ADMIN_EMAIL"));
        assert_eq!(users.count_admins().await.unwrap(), 0);
    }
}
