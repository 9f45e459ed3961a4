//! Pure reminder due-ness rules.
//!
//! Every decision here is a function of the appointment and `now`; nothing
//! reads the clock or touches storage, so the rules are unit-testable in
//! isolation.

use chrono::{DateTime, Duration, FixedOffset, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use shopcrm_core::config::ReminderConfig;
use shopcrm_core::error::AppError;
use shopcrm_core::result::AppResult;
use shopcrm_entity::appointment::{Appointment, ReminderKind};

/// The same-day reminder never goes out further ahead of the appointment
/// than this, so it cannot fall due in the same window as the 24h one.
const SAME_DAY_MAX_LEAD_HOURS: i64 = 12;

/// Furthest a caller-supplied reference time may sit from the real clock.
const MAX_REFERENCE_SKEW_DAYS: i64 = 366;

/// Reject a reference time more than 366 days away from `current`.
pub fn check_reference_time(now: DateTime<Utc>, current: DateTime<Utc>) -> AppResult<()> {
    if (now - current).abs() > Duration::days(MAX_REFERENCE_SKEW_DAYS) {
        return Err(AppError::validation(format!(
            "reference time {now} is more than {MAX_REFERENCE_SKEW_DAYS} days from the current time"
        )));
    }
    Ok(())
}

/// Where a single reminder kind stands for an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    /// Threshold not yet reached.
    Pending,
    /// Threshold crossed and not yet sent.
    Due,
    /// Already delivered.
    Sent,
    /// Will never be sent: disabled, terminal status, or the appointment
    /// has already started.
    Suppressed,
}

/// Threshold rules for each reminder kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderPolicy {
    offset: FixedOffset,
    same_day_send_hour: u32,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            same_day_send_hour: 0,
        }
    }
}

impl ReminderPolicy {
    /// Build a policy for a shop at `utc_offset_minutes` that sends same-day
    /// reminders from `same_day_send_hour` local time.
    pub fn new(utc_offset_minutes: i32, same_day_send_hour: u32) -> AppResult<Self> {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "reminders.utc_offset_minutes out of range: {utc_offset_minutes}"
                ))
            })?;

        if same_day_send_hour > 23 {
            return Err(AppError::configuration(format!(
                "reminders.same_day_send_hour must be 0-23, got {same_day_send_hour}"
            )));
        }

        Ok(Self {
            offset,
            same_day_send_hour,
        })
    }

    /// Build a policy from the `reminders` config section.
    pub fn from_config(config: &ReminderConfig) -> AppResult<Self> {
        Self::new(config.utc_offset_minutes, config.same_day_send_hour)
    }

    /// The shop's local offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Instant from which `kind` may be sent for an appointment at `scheduled_at`.
    pub fn threshold(&self, kind: ReminderKind, scheduled_at: DateTime<Utc>) -> DateTime<Utc> {
        match kind.fixed_lead() {
            Some(lead) => scheduled_at - lead,
            None => self.same_day_threshold(scheduled_at),
        }
    }

    /// Start of the appointment's local calendar day plus the send hour, no
    /// earlier than twelve hours before the appointment and never later than
    /// the appointment itself.
    fn same_day_threshold(&self, scheduled_at: DateTime<Utc>) -> DateTime<Utc> {
        let local_day = scheduled_at.with_timezone(&self.offset).date_naive();
        let opening = local_day
            .and_hms_opt(self.same_day_send_hour, 0, 0)
            .and_then(|naive| self.offset.from_local_datetime(&naive).single())
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or(scheduled_at);

        opening
            .max(scheduled_at - Duration::hours(SAME_DAY_MAX_LEAD_HOURS))
            .min(scheduled_at)
    }

    /// State of `kind` for `appointment` at `now`.
    pub fn reminder_state(
        &self,
        appointment: &Appointment,
        kind: ReminderKind,
        now: DateTime<Utc>,
    ) -> ReminderState {
        if appointment.has_sent(kind) {
            return ReminderState::Sent;
        }
        if !appointment.accepts_reminders()
            || !appointment.reminder_settings.is_enabled(kind)
            || appointment.scheduled_at <= now
        {
            return ReminderState::Suppressed;
        }
        if now >= self.threshold(kind, appointment.scheduled_at) {
            ReminderState::Due
        } else {
            ReminderState::Pending
        }
    }

    /// Kinds due for `appointment` at `now`, longest lead time first.
    pub fn due_reminders(&self, appointment: &Appointment, now: DateTime<Utc>) -> Vec<ReminderKind> {
        ReminderKind::ALL
            .into_iter()
            .filter(|kind| self.reminder_state(appointment, *kind, now) == ReminderState::Due)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopcrm_core::types::id::CustomerId;
    use shopcrm_entity::appointment::{AppointmentStatus, PreferredChannel, ReminderSettings};

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn appointment(scheduled_at: DateTime<Utc>) -> Appointment {
        Appointment::new(CustomerId::new(), scheduled_at)
            .with_reminder_settings(ReminderSettings::all_enabled(PreferredChannel::Email))
    }

    #[test]
    fn test_only_day_before_due_at_23h50m() {
        let now = at("2026-03-10T08:00:00Z");
        let appt = appointment(now + Duration::hours(23) + Duration::minutes(50));

        assert_eq!(
            ReminderPolicy::default().due_reminders(&appt, now),
            vec![ReminderKind::DayBefore]
        );
    }

    #[test]
    fn test_only_day_before_due_just_after_midnight() {
        // Appointment lands late on the same calendar day it is evaluated.
        let now = at("2026-03-10T00:05:00Z");
        let appt = appointment(now + Duration::hours(23) + Duration::minutes(50));

        let policy = ReminderPolicy::default();
        assert_eq!(policy.due_reminders(&appt, now), vec![ReminderKind::DayBefore]);
        assert_eq!(
            policy.threshold(ReminderKind::SameDay, appt.scheduled_at),
            at("2026-03-10T11:55:00Z")
        );
        assert_eq!(
            policy.reminder_state(&appt, ReminderKind::SameDay, now),
            ReminderState::Pending
        );
    }

    #[test]
    fn test_downtime_yields_kinds_in_lead_order() {
        let now = at("2026-03-10T08:00:00Z");
        let appt = appointment(now + Duration::minutes(90));

        assert_eq!(
            ReminderPolicy::default().due_reminders(&appt, now),
            vec![
                ReminderKind::DayBefore,
                ReminderKind::TwoHours,
                ReminderKind::SameDay
            ]
        );
    }

    #[test]
    fn test_disabled_and_sent_kinds_are_not_due() {
        let now = at("2026-03-10T08:00:00Z");
        let mut appt = appointment(now + Duration::minutes(90));
        appt.reminder_settings.send_24h_reminder = false;
        appt.reminders_sent.insert(ReminderKind::TwoHours);

        let policy = ReminderPolicy::default();
        assert_eq!(policy.due_reminders(&appt, now), vec![ReminderKind::SameDay]);
        assert_eq!(
            policy.reminder_state(&appt, ReminderKind::DayBefore, now),
            ReminderState::Suppressed
        );
        assert_eq!(
            policy.reminder_state(&appt, ReminderKind::TwoHours, now),
            ReminderState::Sent
        );
    }

    #[test]
    fn test_terminal_status_suppresses_everything() {
        let now = at("2026-03-10T08:00:00Z");
        for status in [AppointmentStatus::Cancelled, AppointmentStatus::Completed] {
            let appt = appointment(now + Duration::minutes(30)).with_status(status);
            assert!(ReminderPolicy::default().due_reminders(&appt, now).is_empty());
        }
    }

    #[test]
    fn test_past_appointment_is_suppressed() {
        let now = at("2026-03-10T08:00:00Z");
        let appt = appointment(now - Duration::minutes(1));
        assert_eq!(
            ReminderPolicy::default().reminder_state(&appt, ReminderKind::TwoHours, now),
            ReminderState::Suppressed
        );
    }

    #[test]
    fn test_same_day_uses_local_calendar_day() {
        // Shop at UTC-5 sending same-day reminders from 07:00 local.
        let policy = ReminderPolicy::new(-300, 7).unwrap();
        let scheduled = at("2026-03-10T19:00:00Z"); // 14:00 local

        assert_eq!(
            policy.threshold(ReminderKind::SameDay, scheduled),
            at("2026-03-10T12:00:00Z")
        );

        let mut appt = appointment(scheduled);
        appt.reminder_settings = ReminderSettings {
            send_24h_reminder: false,
            send_2h_reminder: false,
            send_same_day_reminder: true,
            preferred_channel: PreferredChannel::Sms,
        };
        assert_eq!(
            policy.reminder_state(&appt, ReminderKind::SameDay, at("2026-03-10T11:59:00Z")),
            ReminderState::Pending
        );
        assert_eq!(
            policy.reminder_state(&appt, ReminderKind::SameDay, at("2026-03-10T12:00:00Z")),
            ReminderState::Due
        );
    }

    #[test]
    fn test_same_day_threshold_clamped_to_appointment() {
        let policy = ReminderPolicy::new(0, 9).unwrap();
        let early = at("2026-03-10T07:30:00Z");
        assert_eq!(policy.threshold(ReminderKind::SameDay, early), early);
    }

    #[test]
    fn test_reference_time_bounded_by_skew() {
        let current = at("2026-03-10T08:00:00Z");
        assert!(check_reference_time(current + Duration::days(30), current).is_ok());
        assert!(check_reference_time(current - Duration::days(366), current).is_ok());

        let err = check_reference_time(current + Duration::days(367), current).unwrap_err();
        assert_eq!(err.kind, shopcrm_core::error::ErrorKind::Validation);
        assert!(check_reference_time(current - Duration::days(400), current).is_err());
    }

    #[test]
    fn test_invalid_policy_rejected() {
        assert!(ReminderPolicy::new(0, 24).is_err());
        assert!(ReminderPolicy::new(24 * 60 + 1, 0).is_err());
        assert!(ReminderPolicy::new(i32::MAX, 0).is_err());
    }
}
