//! PostgreSQL connection pool management.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use shopcrm_core::config::DatabaseConfig;
use shopcrm_core::error::{AppError, ErrorKind};
use shopcrm_core::result::AppResult;

use crate::migration;
use crate::repositories::{AppointmentRepository, CustomerRepository};

/// Repositories built over one pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Appointment store.
    pub appointments: AppointmentRepository,
    /// Customer directory.
    pub customers: CustomerRepository,
}

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Open a pool and bring the schema up to date.
    pub async fn connect_and_migrate(config: &DatabaseConfig) -> AppResult<Self> {
        let db = Self::connect(config).await?;
        migration::run_migrations(&db.pool).await?;
        Ok(db)
    }

    /// Construct repositories sharing this pool.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            appointments: AppointmentRepository::new(self.pool.clone()),
            customers: CustomerRepository::new(self.pool.clone()),
        }
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Mask the password portion of a database URL for safe logging.
fn mask_password(url: &str) -> String {
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    let Some(at_pos) = url.rfind('@') else {
        return url.to_string();
    };
    match url[scheme_end..at_pos].find(':') {
        Some(rel) => {
            let colon_pos = scheme_end + rel;
            format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..])
        }
        None => url.to_string(),
    }
}
