//! # shopcrm-service
//!
//! The appointment communication workflow. [`ReminderScheduler`] decides
//! which reminders are due, dispatches them through the configured
//! notifier, and records each sent kind so it never goes out twice. It also
//! sends booking confirmations on request.
//!
//! Dependencies are injected at construction time as `Arc<dyn Trait>`
//! handles, so the same scheduler runs over PostgreSQL in production and
//! over the in-memory store in tests.

pub mod dispatch;
pub mod reminder;

pub use dispatch::Dispatcher;
pub use reminder::{
    AppointmentReport, BatchReport, DueReminder, FailedReminder, ReminderPolicy, ReminderScheduler,
    ReminderState, check_reference_time,
};
