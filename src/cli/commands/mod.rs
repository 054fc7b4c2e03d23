pub mod db;
pub mod users;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Open the configured database and bring its schema up to date
pub(crate) async fn open(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(pool)
}
