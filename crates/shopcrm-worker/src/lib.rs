//! Background jobs for ShopCRM.
//!
//! This crate provides:
//! - A job executor that dispatches job requests to registered handlers
//! - A cron scheduler that fires the periodic reminder sweep
//! - The reminder sweep job handler

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler, JobRequest};
pub use jobs::ReminderJobHandler;
pub use scheduler::CronScheduler;
