use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Schema statements, applied in order. Every statement is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id                  INTEGER PRIMARY KEY AUTOINCREMENT,
        email               TEXT NOT NULL UNIQUE,
        name                TEXT NOT NULL,
        password_hash       TEXT,
        role                TEXT NOT NULL DEFAULT 'User',
        google_id           TEXT UNIQUE,
        drive_access_token  TEXT,
        drive_refresh_token TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS settings (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id        TEXT,
        api_key          TEXT,
        source_folder_id TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recurring_schedules (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        school_name  TEXT NOT NULL,
        class_name   TEXT NOT NULL,
        days_of_week TEXT NOT NULL,
        start_time   TEXT NOT NULL,
        end_time     TEXT NOT NULL,
        expiry_date  TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS one_off_schedules (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        school_name TEXT NOT NULL,
        class_name  TEXT NOT NULL,
        date        TEXT NOT NULL,
        start_time  TEXT NOT NULL,
        end_time    TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_users_role ON users (role)",
];

/// Connection pool setup, schema creation and health checks for the backing store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool for the configured database URL.
    ///
    /// In-memory databases exist per connection, so they are pinned to a single
    /// connection that never expires.
    pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
        if config.url.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|_| DatabaseError::InvalidDatabaseUrl(config.url.clone()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let in_memory = Self::is_in_memory(&config.url);
        let mut pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .max_connections(if in_memory { 1 } else { config.max_connections.max(1) });

        if in_memory {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }

        let pool = pool_options.connect_with(options).await?;

        info!("Opened database pool for: {}", Self::redact(&config.url));
        Ok(pool)
    }

    /// Create every table that does not exist yet
    pub async fn migrate(pool: &SqlitePool) -> Result<(), DatabaseError> {
        let mut tx = pool.begin().await?;
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        }
        tx.commit().await?;

        info!("Database schema is up to date");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &SqlitePool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    fn is_in_memory(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }

    /// Strip query parameters before logging the URL
    fn redact(url: &str) -> &str {
        url.split('?').next().unwrap_or(url)
    }
}

/// Open a transaction that already holds the write lock.
///
/// SQLite cannot upgrade a deferred transaction from reader to writer while another
/// connection writes; it fails with SQLITE_BUSY instead of waiting. Taking the lock with
/// the first statement lets `busy_timeout` queue concurrent writers.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE settings SET id = id WHERE 0").execute(&mut *tx).await?;
    Ok(tx)
}

/// True when the store gave up waiting for a lock held by another connection
pub fn is_busy(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| code & 0xff == 5)
        .unwrap_or(false)
}

/// True when the store rejected a write because of a UNIQUE constraint
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}
