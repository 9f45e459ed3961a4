//! Batch report types returned by a reminder run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopcrm_core::types::id::{AppointmentId, CustomerId};
use shopcrm_entity::appointment::{PreferredChannel, ReminderKind};

/// A reminder that was attempted but not delivered and recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedReminder {
    /// Reminder kind.
    pub kind: ReminderKind,
    /// Why it failed.
    pub reason: String,
}

/// What happened to one appointment during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentReport {
    /// Appointment processed.
    pub appointment_id: AppointmentId,
    /// Kinds found due, in evaluation order.
    pub attempted: Vec<ReminderKind>,
    /// Kinds delivered and recorded.
    pub sent: Vec<ReminderKind>,
    /// Kinds that failed, with reasons.
    pub failed: Vec<FailedReminder>,
    /// Appointment-level failure that stopped processing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppointmentReport {
    pub(crate) fn new(appointment_id: AppointmentId) -> Self {
        Self {
            appointment_id,
            attempted: Vec::new(),
            sent: Vec::new(),
            failed: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn fail(&mut self, kind: ReminderKind, reason: impl Into<String>) {
        self.failed.push(FailedReminder {
            kind,
            reason: reason.into(),
        });
    }
}

/// Summary of one `generate_due_reminders` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Reference time the run evaluated against.
    pub now: DateTime<Utc>,
    /// Appointments returned by the candidate query.
    pub candidates: usize,
    /// Reminders delivered and recorded.
    pub dispatched: usize,
    /// Reminders that failed.
    pub failed: usize,
    /// Appointments with at least one due reminder or an error.
    pub appointments: Vec<AppointmentReport>,
}

impl BatchReport {
    pub(crate) fn new(now: DateTime<Utc>, candidates: usize) -> Self {
        Self {
            now,
            candidates,
            dispatched: 0,
            failed: 0,
            appointments: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, report: AppointmentReport) {
        self.dispatched += report.sent.len();
        self.failed += report.failed.len();
        self.appointments.push(report);
    }

    /// Entry for a given appointment, if it was reported.
    pub fn for_appointment(&self, id: AppointmentId) -> Option<&AppointmentReport> {
        self.appointments.iter().find(|r| r.appointment_id == id)
    }

    /// Number of appointments that hit an appointment-level error.
    pub fn errored(&self) -> usize {
        self.appointments.iter().filter(|r| r.error.is_some()).count()
    }
}

/// A reminder that a run at the given time would send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueReminder {
    /// Appointment the reminder is for.
    pub appointment_id: AppointmentId,
    /// Customer to contact.
    pub customer_id: CustomerId,
    /// Appointment start.
    pub scheduled_at: DateTime<Utc>,
    /// Reminder kind.
    pub kind: ReminderKind,
    /// Channel preference it would go out on.
    pub channel: PreferredChannel,
}
