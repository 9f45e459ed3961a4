//! Built-in job handler implementations.

pub mod reminder;

pub use reminder::ReminderJobHandler;
