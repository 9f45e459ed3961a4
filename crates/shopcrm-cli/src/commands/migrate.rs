//! Database migration command.

use shopcrm_core::config::AppConfig;
use shopcrm_core::error::AppError;
use shopcrm_database::DatabasePool;

use crate::output;

/// Apply all pending migrations
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    println!("Running database migrations...");
    let db = DatabasePool::connect_and_migrate(&config.database).await?;
    db.close().await;
    output::print_success("All migrations applied.");
    Ok(())
}
