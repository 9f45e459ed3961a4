//! Reminder due-ness rules, batch reports, and the scheduler itself.

pub mod policy;
pub mod report;
pub mod scheduler;

pub use policy::{ReminderPolicy, ReminderState, check_reference_time};
pub use report::{AppointmentReport, BatchReport, DueReminder, FailedReminder};
pub use scheduler::ReminderScheduler;
