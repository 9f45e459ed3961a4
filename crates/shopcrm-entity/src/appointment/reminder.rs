//! Reminder kinds and per-appointment reminder settings.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::notification::Channel;

/// One of the lead-time categories a reminder can belong to.
///
/// Variants are declared in descending lead time; the derived `Ord`
/// therefore sorts 24h before 2h before same-day, which is the order
/// reminders are evaluated and reported in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ReminderKind {
    /// Sent once the appointment is 24 hours away.
    #[serde(rename = "24h")]
    DayBefore,
    /// Sent once the appointment is 2 hours away.
    #[serde(rename = "2h")]
    TwoHours,
    /// Sent on the calendar day of the appointment.
    #[serde(rename = "same_day")]
    SameDay,
}

impl ReminderKind {
    /// All kinds in evaluation order.
    pub const ALL: [ReminderKind; 3] = [Self::DayBefore, Self::TwoHours, Self::SameDay];

    /// The widest window any kind can become due in.
    pub fn max_lead() -> Duration {
        Duration::hours(24)
    }

    /// Fixed lead time before the appointment, if the kind has one.
    ///
    /// Same-day reminders are anchored to the local calendar day instead.
    pub fn fixed_lead(&self) -> Option<Duration> {
        match self {
            Self::DayBefore => Some(Duration::hours(24)),
            Self::TwoHours => Some(Duration::hours(2)),
            Self::SameDay => None,
        }
    }

    /// Return the wire/database form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DayBefore => "24h",
            Self::TwoHours => "2h",
            Self::SameDay => "same_day",
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(Self::DayBefore),
            "2h" => Ok(Self::TwoHours),
            "same_day" | "sameDay" => Ok(Self::SameDay),
            other => Err(format!("Unknown reminder kind: '{other}'")),
        }
    }
}

/// Customer channel preference for appointment messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "preferred_channel", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PreferredChannel {
    /// Email only.
    Email,
    /// SMS only.
    Sms,
    /// Email and SMS.
    Both,
}

impl PreferredChannel {
    /// Concrete channels this preference fans out to.
    pub fn channels(&self) -> &'static [Channel] {
        match self {
            Self::Email => &[Channel::Email],
            Self::Sms => &[Channel::Sms],
            Self::Both => &[Channel::Email, Channel::Sms],
        }
    }

    /// Return the preference as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for PreferredChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-appointment reminder switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    /// Send a reminder 24 hours ahead.
    #[serde(rename = "send24hReminder")]
    pub send_24h_reminder: bool,
    /// Send a reminder 2 hours ahead.
    #[serde(rename = "send2hReminder")]
    pub send_2h_reminder: bool,
    /// Send a reminder on the appointment day.
    pub send_same_day_reminder: bool,
    /// Channel(s) to deliver through.
    pub preferred_channel: PreferredChannel,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            send_24h_reminder: true,
            send_2h_reminder: true,
            send_same_day_reminder: false,
            preferred_channel: PreferredChannel::Email,
        }
    }
}

impl ReminderSettings {
    /// Settings with every reminder kind switched on.
    pub fn all_enabled(preferred_channel: PreferredChannel) -> Self {
        Self {
            send_24h_reminder: true,
            send_2h_reminder: true,
            send_same_day_reminder: true,
            preferred_channel,
        }
    }

    /// Whether the given kind is switched on.
    pub fn is_enabled(&self, kind: ReminderKind) -> bool {
        match kind {
            ReminderKind::DayBefore => self.send_24h_reminder,
            ReminderKind::TwoHours => self.send_2h_reminder,
            ReminderKind::SameDay => self.send_same_day_reminder,
        }
    }
}
