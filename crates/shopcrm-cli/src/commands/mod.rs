//! CLI command definitions and dispatch.

pub mod confirm;
pub mod migrate;
pub mod reminders;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use shopcrm_core::config::AppConfig;
use shopcrm_core::error::AppError;
use shopcrm_core::traits::SystemClock;
use shopcrm_database::DatabasePool;
use shopcrm_notify::build_notifier;
use shopcrm_service::ReminderScheduler;

use crate::output::OutputFormat;

/// ShopCRM appointment communication administration
#[derive(Debug, Parser)]
#[command(name = "shopcrm-cli", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment; loads config/default.toml and config/<ENV>.toml
    #[arg(short, long, env = "SHOPCRM_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run or preview the reminder sweep
    Reminders(reminders::RemindersArgs),
    /// Send a booking confirmation for an appointment
    Confirm(confirm::ConfirmArgs),
    /// Apply pending database migrations
    Migrate,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        match &self.command {
            Commands::Reminders(args) => reminders::execute(args, &config, self.format).await,
            Commands::Confirm(args) => confirm::execute(args, &config, self.format).await,
            Commands::Migrate => migrate::execute(&config).await,
        }
    }
}

/// Helper: connect to the database and assemble a scheduler over it
pub async fn connect_scheduler(
    config: &AppConfig,
) -> Result<(DatabasePool, ReminderScheduler), AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    let repos = db.repositories();
    let notifier = build_notifier(
        &config.notifications,
        std::time::Duration::from_secs(config.reminders.dispatch_timeout_seconds),
    )?;

    let scheduler = ReminderScheduler::from_config(
        Arc::new(repos.appointments),
        Arc::new(repos.customers),
        notifier,
        Arc::new(SystemClock),
        &config.reminders,
        &config.notifications,
    )?;

    Ok((db, scheduler))
}
