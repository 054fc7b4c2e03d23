use anyhow::Context;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{GoogleTokenVerifier, IdentityVerifier, SessionIssuer};
use crate::config::AppConfig;
use crate::database::{bootstrap, DatabaseManager};
use crate::services::{MediaProbe, OneOffScheduleRepository, RecurringScheduleRepository, SettingsStore, UserDirectory};

/// Shared application context handed to every handler and guard.
///
/// Cloning is cheap: the pool, services and issuer are all reference counted.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: SqlitePool,
    pub users: UserDirectory,
    pub settings: SettingsStore,
    pub recurring: RecurringScheduleRepository,
    pub one_off: OneOffScheduleRepository,
    pub sessions: SessionIssuer,
    pub identity: Arc<dyn IdentityVerifier>,
    pub media: MediaProbe,
}

impl AppState {
    pub fn new(config: AppConfig, db: SqlitePool, identity: Arc<dyn IdentityVerifier>, media: MediaProbe) -> Self {
        let sessions = SessionIssuer::new(&config.security.jwt_secret, config.security.jwt_expiry_hours);
        Self {
            users: UserDirectory::new(db.clone()),
            settings: SettingsStore::new(db.clone()),
            recurring: RecurringScheduleRepository::new(db.clone()),
            one_off: OneOffScheduleRepository::new(db.clone()),
            sessions,
            identity,
            media,
            db,
            config: Arc::new(config),
        }
    }

    /// Open the store, apply the schema and defaults, and wire the production integrations
    pub async fn initialize(config: AppConfig) -> anyhow::Result<Self> {
        let db = DatabaseManager::connect(&config.database)
            .await
            .context("failed to open database")?;
        DatabaseManager::migrate(&db).await.context("failed to apply schema")?;
        bootstrap::ensure_defaults(&db, &config.security)
            .await
            .context("failed to create default records")?;

        let timeout = Duration::from_secs(config.integrations.outbound_timeout_secs);
        let identity = GoogleTokenVerifier::new(config.integrations.google_tokeninfo_url.clone(), timeout)
            .context("failed to build identity verifier client")?;
        let media = MediaProbe::from_config(&config.integrations).context("failed to build media client")?;

        Ok(Self::new(config, db, Arc::new(identity), media))
    }
}
