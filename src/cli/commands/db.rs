use serde_json::json;

use super::open;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::bootstrap;

pub async fn migrate(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = open(config).await?;
    let report = bootstrap::ensure_defaults(&pool, &config.security).await?;

    output_success(
        output_format,
        "Database schema is up to date",
        Some(json!({
            "settings_created": report.settings_created,
            "admin_created": report.admin_created,
        })),
    )
}
