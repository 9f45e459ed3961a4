//! Message templates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::appointment::ReminderKind;

/// Which message is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "template", content = "kind", rename_all = "snake_case")]
pub enum Template {
    /// An appointment reminder of the given kind.
    Reminder(ReminderKind),
    /// A booking confirmation.
    Confirmation,
}

impl Template {
    /// Stable template name, used in logs and as the provider category.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reminder(ReminderKind::DayBefore) => "appointment_reminder_24h",
            Self::Reminder(ReminderKind::TwoHours) => "appointment_reminder_2h",
            Self::Reminder(ReminderKind::SameDay) => "appointment_reminder_same_day",
            Self::Confirmation => "appointment_confirmation",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
