//! Reminder sweep configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the periodic appointment reminder sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Whether the periodic sweep is registered with the cron scheduler.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (seconds first) for the sweep.
    #[serde(default = "default_schedule")]
    pub schedule: String,
    /// Upper bound on a single provider call, in seconds.
    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout_seconds: u64,
    /// Offset of the shop's local time from UTC, in minutes.
    ///
    /// Used to decide which calendar day an appointment falls on for
    /// same-day reminders.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Local hour (0-23) from which same-day reminders may go out.
    #[serde(default)]
    pub same_day_send_hour: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: default_schedule(),
            dispatch_timeout_seconds: default_dispatch_timeout(),
            utc_offset_minutes: 0,
            same_day_send_hour: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> String {
    "0 */5 * * * *".to_string()
}

fn default_dispatch_timeout() -> u64 {
    10
}
