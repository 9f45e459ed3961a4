//! Template variables for appointment messages.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use shopcrm_core::types::id::AppointmentId;
use shopcrm_entity::appointment::Appointment;
use shopcrm_entity::customer::CustomerContact;

/// Values substituted into email templates and SMS bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Appointment the message is about.
    pub appointment_id: AppointmentId,
    /// Recipient name.
    pub customer_name: String,
    /// Shop display name.
    pub shop_name: String,
    /// Appointment start (UTC).
    pub scheduled_at: DateTime<Utc>,
    /// Appointment start rendered in shop-local time.
    pub local_time: String,
    /// Requested service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Vehicle shorthand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
}

impl MessagePayload {
    /// Build the payload for an appointment and its customer.
    pub fn for_appointment(
        appointment: &Appointment,
        contact: &CustomerContact,
        shop_name: &str,
        offset: FixedOffset,
    ) -> Self {
        let local_time = appointment
            .scheduled_at
            .with_timezone(&offset)
            .format("%a %b %-d at %-I:%M %p")
            .to_string();

        Self {
            appointment_id: appointment.id,
            customer_name: contact.name.clone(),
            shop_name: shop_name.to_string(),
            scheduled_at: appointment.scheduled_at,
            local_time,
            service: appointment.service_description.clone(),
            vehicle: appointment.vehicle_label.clone(),
        }
    }
}
