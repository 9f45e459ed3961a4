//! Message text for each template.
//!
//! Email providers with a configured dynamic template render their own
//! body; these strings are used for SMS and for plain-text email.

use shopcrm_entity::appointment::ReminderKind;
use shopcrm_entity::notification::Template;

use crate::payload::MessagePayload;

/// Formats appointment messages.
pub struct MessageFormatter;

impl MessageFormatter {
    /// Email subject line.
    pub fn subject(template: Template, payload: &MessagePayload) -> String {
        match template {
            Template::Confirmation => {
                format!("Your appointment at {} is booked", payload.shop_name)
            }
            Template::Reminder(ReminderKind::DayBefore) => {
                format!("Reminder: your appointment tomorrow at {}", payload.shop_name)
            }
            Template::Reminder(ReminderKind::TwoHours) => {
                format!("See you soon at {}", payload.shop_name)
            }
            Template::Reminder(ReminderKind::SameDay) => {
                format!("Today: your appointment at {}", payload.shop_name)
            }
        }
    }

    /// Plain-text body shared by SMS and fallback email.
    pub fn body(template: Template, payload: &MessagePayload) -> String {
        let what = Self::describe_service(payload);
        let lead = match template {
            Template::Confirmation => format!(
                "Hi {}, your appointment{} is confirmed for {}.",
                payload.customer_name, what, payload.local_time
            ),
            Template::Reminder(ReminderKind::DayBefore) => format!(
                "Hi {}, a reminder that your appointment{} is tomorrow, {}.",
                payload.customer_name, what, payload.local_time
            ),
            Template::Reminder(ReminderKind::TwoHours) => format!(
                "Hi {}, your appointment{} starts in about 2 hours ({}).",
                payload.customer_name, what, payload.local_time
            ),
            Template::Reminder(ReminderKind::SameDay) => format!(
                "Hi {}, your appointment{} is today, {}.",
                payload.customer_name, what, payload.local_time
            ),
        };
        format!("{lead} - {}", payload.shop_name)
    }

    fn describe_service(payload: &MessagePayload) -> String {
        match (&payload.service, &payload.vehicle) {
            (Some(service), Some(vehicle)) => format!(" for {service} on your {vehicle}"),
            (Some(service), None) => format!(" for {service}"),
            (None, Some(vehicle)) => format!(" for your {vehicle}"),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shopcrm_core::types::id::AppointmentId;

    fn payload(service: Option<&str>, vehicle: Option<&str>) -> MessagePayload {
        MessagePayload {
            appointment_id: AppointmentId::new(),
            customer_name: "Ari".to_string(),
            shop_name: "Northside Auto".to_string(),
            scheduled_at: Utc::now(),
            local_time: "Wed Mar 11 at 9:30 AM".to_string(),
            service: service.map(str::to_string),
            vehicle: vehicle.map(str::to_string),
        }
    }

    #[test]
    fn test_reminder_body_mentions_service_and_vehicle() {
        let body = MessageFormatter::body(
            Template::Reminder(ReminderKind::DayBefore),
            &payload(Some("an oil change"), Some("2019 Civic")),
        );
        assert_eq!(
            body,
            "Hi Ari, a reminder that your appointment for an oil change on your 2019 Civic \
             is tomorrow, Wed Mar 11 at 9:30 AM. - Northside Auto"
        );
    }

    #[test]
    fn test_confirmation_without_details() {
        let body = MessageFormatter::body(Template::Confirmation, &payload(None, None));
        assert!(body.starts_with("Hi Ari, your appointment is confirmed for"));
        assert_eq!(
            MessageFormatter::subject(Template::Confirmation, &payload(None, None)),
            "Your appointment at Northside Auto is booked"
        );
    }
}
