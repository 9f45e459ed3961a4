//! Appointment entity model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopcrm_core::types::id::{AppointmentId, CustomerId};

use super::reminder::{ReminderKind, ReminderSettings};
use super::status::AppointmentStatus;

/// A booked service appointment, reduced to the fields the communication
/// workflow reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique appointment identifier.
    pub id: AppointmentId,
    /// Customer the appointment belongs to.
    pub customer_id: CustomerId,
    /// Start of the appointment.
    pub scheduled_at: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: AppointmentStatus,
    /// Which reminders to send and how.
    pub reminder_settings: ReminderSettings,
    /// Reminder kinds already delivered.
    pub reminders_sent: BTreeSet<ReminderKind>,
    /// Requested service, e.g. "Oil change".
    pub service_description: Option<String>,
    /// Vehicle shorthand, e.g. "2019 Honda Civic".
    pub vehicle_label: Option<String>,
    /// When the appointment was booked.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Create a freshly booked appointment with default reminder settings.
    pub fn new(customer_id: CustomerId, scheduled_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: AppointmentId::new(),
            customer_id,
            scheduled_at,
            status: AppointmentStatus::Scheduled,
            reminder_settings: ReminderSettings::default(),
            reminders_sent: BTreeSet::new(),
            service_description: None,
            vehicle_label: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the reminder settings.
    pub fn with_reminder_settings(mut self, settings: ReminderSettings) -> Self {
        self.reminder_settings = settings;
        self
    }

    /// Replace the status.
    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the service description and vehicle label.
    pub fn with_service(mut self, description: &str, vehicle: &str) -> Self {
        self.service_description = Some(description.to_string());
        self.vehicle_label = Some(vehicle.to_string());
        self
    }

    /// Whether the given reminder kind has already gone out.
    pub fn has_sent(&self, kind: ReminderKind) -> bool {
        self.reminders_sent.contains(&kind)
    }

    /// Whether reminders may still be sent for this appointment.
    pub fn accepts_reminders(&self) -> bool {
        !self.status.is_terminal()
    }
}
