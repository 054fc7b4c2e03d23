//! Helpers for unit tests that need a migrated store.

use sqlx::SqlitePool;
use std::path::Path;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Open a fresh in-memory store with the schema applied
pub async fn memory_pool() -> SqlitePool {
    let config = AppConfig::in_memory();
    let pool = DatabaseManager::connect(&config.database)
        .await
        .expect("in-memory database should open");
    DatabaseManager::migrate(&pool)
        .await
        .expect("schema should apply");
    pool
}

/// Open a migrated file-backed store in `dir` with several connections, for lock contention tests
pub async fn file_pool(dir: &Path) -> SqlitePool {
    let mut config = AppConfig::in_memory();
    config.database.url = format!("sqlite://{}", dir.join("store.db").display());
    config.database.max_connections = 8;
    let pool = DatabaseManager::connect(&config.database)
        .await
        .expect("file database should open");
    DatabaseManager::migrate(&pool)
        .await
        .expect("schema should apply");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pools_are_isolated() {
        let first = memory_pool().await;
        let second = memory_pool().await;

        sqlx::query("INSERT INTO users (email, name) VALUES ('only@example.com', 'Only')")
            .execute(&first)
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&second)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
