//! Application state shared across all handlers.

use std::sync::Arc;

use shopcrm_core::config::AppConfig;
use shopcrm_service::ReminderScheduler;

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Reminder and confirmation scheduler
    pub scheduler: Arc<ReminderScheduler>,
}

impl AppState {
    /// Bundle the shared dependencies.
    pub fn new(config: Arc<AppConfig>, scheduler: Arc<ReminderScheduler>) -> Self {
        Self { config, scheduler }
    }
}
