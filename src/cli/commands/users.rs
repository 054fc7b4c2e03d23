use serde_json::json;

use super::open;
use crate::cli::utils::{output_empty_collection, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::UserView;
use crate::services::UserDirectory;

pub async fn list(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let users = UserDirectory::new(open(config).await?).list().await?;
    if users.is_empty() {
        return output_empty_collection(output_format, "users", "No users found");
    }

    match output_format {
        OutputFormat::Json => {
            let users: Vec<UserView> = users.into_iter().map(UserView::from).collect();
            println!("{}", serde_json::to_string_pretty(&json!({ "users": users }))?);
        }
        OutputFormat::Text => {
            println!("{:<6} {:<32} {:<24} {:<6} {}", "ID", "EMAIL", "NAME", "ROLE", "GOOGLE");
            println!("{}", "-".repeat(80));
            for user in &users {
                let google = if user.google_id.is_some() { "yes" } else { "" };
                println!("{:<6} {:<32} {:<24} {:<6} {}", user.id, user.email, user.name, user.role.as_str(), google);
            }
        }
    }
    Ok(())
}

pub async fn set_password(
    config: &AppConfig,
    email: &str,
    password: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let users = UserDirectory::new(open(config).await?);
    let user = users
        .find_by_email(email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no user with email '{}'", email))?;

    users.set_password(user.id, password).await?;
    output_success(
        output_format,
        &format!("Password updated for {}", user.email),
        Some(json!({ "user_id": user.id })),
    )
}
