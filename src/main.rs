//! ShopCRM communication server.
//!
//! Wires the stores, notifier, reminder scheduler, cron sweep, and HTTP
//! trigger together and runs until Ctrl+C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use shopcrm_core::config::AppConfig;
use shopcrm_core::error::AppError;
use shopcrm_core::traits::SystemClock;
use shopcrm_database::DatabasePool;
use shopcrm_service::ReminderScheduler;
use shopcrm_worker::{CronScheduler, JobExecutor, ReminderJobHandler};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and `SHOPCRM__*` environment variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SHOPCRM_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ShopCRM communications v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect_and_migrate(&config.database).await?;
    let repos = db.repositories();

    // ── Step 2: Notification providers ───────────────────────────
    let dispatch_timeout = Duration::from_secs(config.reminders.dispatch_timeout_seconds);
    let notifier = shopcrm_notify::build_notifier(&config.notifications, dispatch_timeout)?;

    // ── Step 3: Reminder scheduler ───────────────────────────────
    let scheduler = Arc::new(ReminderScheduler::from_config(
        Arc::new(repos.appointments),
        Arc::new(repos.customers),
        notifier,
        Arc::new(SystemClock),
        &config.reminders,
        &config.notifications,
    )?);

    // ── Step 4: Cron sweep ───────────────────────────────────────
    let mut executor = JobExecutor::new();
    executor.register(Arc::new(ReminderJobHandler::new(Arc::clone(&scheduler))));

    let mut cron = CronScheduler::new(Arc::new(executor)).await?;
    cron.register_reminder_sweep(&config.reminders).await?;
    cron.start().await?;

    // ── Step 5: HTTP server ──────────────────────────────────────
    let state = shopcrm_api::AppState::new(Arc::new(config.clone()), Arc::clone(&scheduler));
    let app = shopcrm_api::build_app(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Listening on {addr}");

    // ── Step 6: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // An in-flight sweep holds the run lock; give it time to finish.
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, cron.shutdown()).await.is_err() {
        tracing::warn!("Cron scheduler did not stop within {grace:?}");
    }

    db.close().await;
    tracing::info!("ShopCRM communications shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
