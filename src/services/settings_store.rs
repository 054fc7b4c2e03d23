use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::database::begin_write;
use crate::database::models::Settings;

const SETTINGS_COLUMNS: &str = "client_id, api_key, source_folder_id";

/// The single settings row. Reads never write; writes replace all three values.
#[derive(Clone)]
pub struct SettingsStore {
    pool: SqlitePool,
}

impl SettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Current settings, or all-absent values when the row was never created
    pub async fn get(&self) -> Result<Settings, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch(&mut conn).await?.unwrap_or_default())
    }

    /// Replace all three values, creating the row if needed
    pub async fn set(&self, settings: &Settings) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE settings SET client_id = ?, api_key = ?, source_folder_id = ? \
             WHERE id = (SELECT MIN(id) FROM settings)",
        )
        .bind(&settings.client_id)
        .bind(&settings.api_key)
        .bind(&settings.source_folder_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            sqlx::query("INSERT INTO settings (client_id, api_key, source_folder_id) VALUES (?, ?, ?)")
                .bind(&settings.client_id)
                .bind(&settings.api_key)
                .bind(&settings.source_folder_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!("Settings updated");
        Ok(())
    }

    /// Create the row with empty values if it does not exist. Returns true when a row was created.
    pub async fn ensure_default(&self) -> Result<bool, sqlx::Error> {
        let mut tx = begin_write(&self.pool).await?;
        if fetch(&mut tx).await?.is_some() {
            return Ok(false);
        }
        sqlx::query("INSERT INTO settings (client_id, api_key, source_folder_id) VALUES ('', '', '')")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}

async fn fetch(conn: &mut SqliteConnection) -> Result<Option<Settings>, sqlx::Error> {
    let sql = format!("SELECT {} FROM settings ORDER BY id LIMIT 1", SETTINGS_COLUMNS);
    sqlx::query_as::<_, Settings>(&sql).fetch_optional(conn).await
}
