//! Store traits consumed by the communication scheduler.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopcrm_core::result::AppResult;
use shopcrm_core::types::id::{AppointmentId, CustomerId};
use shopcrm_entity::appointment::{Appointment, AppointmentStatus, ReminderKind};
use shopcrm_entity::customer::CustomerContact;

/// Result of a conditional "add reminder kind if absent" update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkOutcome {
    /// The kind was added by this call.
    Marked,
    /// The kind was already recorded; nothing changed.
    AlreadySent,
    /// No appointment with that id exists.
    NotFound,
}

/// Appointment persistence as seen by the scheduler.
///
/// `mark_reminder_sent` must be atomic: two concurrent callers marking the
/// same kind see exactly one `Marked`.
#[async_trait]
pub trait AppointmentStore: Send + Sync + std::fmt::Debug {
    /// Appointments whose status is one of `statuses` and whose start lies
    /// in `(after, before]`, earliest first.
    async fn find_upcoming(
        &self,
        statuses: &[AppointmentStatus],
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>>;

    /// Look up a single appointment.
    async fn find_by_id(&self, id: AppointmentId) -> AppResult<Option<Appointment>>;

    /// Record that `kind` was delivered, only if it is not recorded yet.
    async fn mark_reminder_sent(
        &self,
        id: AppointmentId,
        kind: ReminderKind,
    ) -> AppResult<MarkOutcome>;
}

/// Customer contact lookup.
#[async_trait]
pub trait CustomerStore: Send + Sync + std::fmt::Debug {
    /// Contact details for a customer, if the customer exists.
    async fn find_contact(&self, id: CustomerId) -> AppResult<Option<CustomerContact>>;
}
