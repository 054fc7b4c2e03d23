pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "scheduler-admin")]
#[command(about = "Operator tools for the schedule admin database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Database URL (overrides DATABASE_URL)")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the schema and default records")]
    Migrate,

    #[command(about = "List user accounts")]
    ListUsers,

    #[command(about = "Set a user's password")]
    SetPassword {
        #[arg(long, help = "Email of the account")]
        email: String,

        #[arg(long, help = "New password (at least 6 characters)")]
        password: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    match cli.command {
        Commands::Migrate => commands::db::migrate(&config, output_format).await,
        Commands::ListUsers => commands::users::list(&config, output_format).await,
        Commands::SetPassword { email, password } => {
            commands::users::set_password(&config, &email, &password, output_format).await
        }
    }
}
