//! Fan-out of one message across a customer's preferred channels.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use shopcrm_entity::appointment::PreferredChannel;
use shopcrm_entity::customer::CustomerContact;
use shopcrm_entity::notification::{Channel, ChannelDelivery, DispatchOutcome, Template};
use shopcrm_notify::{DispatchError, DispatchResult, MessagePayload, Notifier};

/// Sends a templated message through every channel a preference names,
/// bounding each provider call by a timeout.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher over `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self { notifier, timeout }
    }

    /// Send `template` to `contact` on every channel of `preference`.
    ///
    /// Never errors: per-channel failures are folded into the outcome.
    pub async fn dispatch(
        &self,
        contact: &CustomerContact,
        preference: PreferredChannel,
        template: Template,
        payload: &MessagePayload,
    ) -> DispatchOutcome {
        let mut deliveries = Vec::with_capacity(preference.channels().len());

        for &channel in preference.channels() {
            let result = self.send_one(contact, channel, template, payload).await;
            let delivery = match result {
                Ok(receipt) => {
                    debug!(
                        appointment_id = %payload.appointment_id,
                        channel = %channel,
                        template = %template,
                        message_id = receipt.provider_message_id.as_deref().unwrap_or("-"),
                        "Message accepted"
                    );
                    ChannelDelivery {
                        channel,
                        success: true,
                        provider_message_id: receipt.provider_message_id,
                        reason: None,
                    }
                }
                Err(e) => {
                    warn!(
                        appointment_id = %payload.appointment_id,
                        channel = %channel,
                        template = %template,
                        transient = e.is_transient(),
                        "Message not delivered: {e}"
                    );
                    ChannelDelivery {
                        channel,
                        success: false,
                        provider_message_id: None,
                        reason: Some(e.to_string()),
                    }
                }
            };
            deliveries.push(delivery);
        }

        DispatchOutcome::from_deliveries(deliveries)
    }

    async fn send_one(
        &self,
        contact: &CustomerContact,
        channel: Channel,
        template: Template,
        payload: &MessagePayload,
    ) -> DispatchResult {
        let destination = contact
            .destination_for(channel)
            .ok_or(DispatchError::MissingDestination(channel))?;

        match tokio::time::timeout(
            self.timeout,
            self.notifier.send(&destination, channel, template, payload),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use shopcrm_core::types::id::AppointmentId;
    use shopcrm_entity::appointment::ReminderKind;
    use shopcrm_entity::notification::Destination;
    use shopcrm_notify::RecordingNotifier;

    fn contact(email: Option<&str>, phone: Option<&str>) -> CustomerContact {
        CustomerContact {
            name: "Jo Kim".to_string(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
        }
    }

    fn payload() -> MessagePayload {
        MessagePayload {
            appointment_id: AppointmentId::new(),
            customer_name: "Jo Kim".to_string(),
            shop_name: "Shop".to_string(),
            scheduled_at: Utc::now(),
            local_time: "today".to_string(),
            service: None,
            vehicle: None,
        }
    }

    #[derive(Debug)]
    struct StalledNotifier;

    #[async_trait]
    impl Notifier for StalledNotifier {
        fn name(&self) -> &str {
            "stalled"
        }

        fn supports(&self, _channel: Channel) -> bool {
            true
        }

        async fn send(
            &self,
            _destination: &Destination,
            _channel: Channel,
            _template: Template,
            _payload: &MessagePayload,
        ) -> DispatchResult {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(DispatchError::Transport("unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_both_succeeds_when_one_channel_delivers() {
        let notifier = RecordingNotifier::new();
        let dispatcher = Dispatcher::new(Arc::new(notifier.clone()), Duration::from_secs(1));

        let outcome = dispatcher
            .dispatch(
                &contact(Some("jo@example.com"), None),
                PreferredChannel::Both,
                Template::Reminder(ReminderKind::TwoHours),
                &payload(),
            )
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.deliveries.len(), 2);
        assert!(!outcome.deliveries[1].success);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_destination_fails_without_provider_call() {
        let notifier = RecordingNotifier::new();
        let dispatcher = Dispatcher::new(Arc::new(notifier.clone()), Duration::from_secs(1));

        let outcome = dispatcher
            .dispatch(
                &contact(Some("jo@example.com"), None),
                PreferredChannel::Sms,
                Template::Confirmation,
                &payload(),
            )
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.reason.as_deref(), Some("sms: customer has no sms destination"));
        assert_eq!(notifier.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_a_failed_delivery() {
        let dispatcher = Dispatcher::new(Arc::new(StalledNotifier), Duration::from_secs(5));

        let outcome = dispatcher
            .dispatch(
                &contact(Some("jo@example.com"), None),
                PreferredChannel::Email,
                Template::Confirmation,
                &payload(),
            )
            .await;

        assert!(!outcome.success);
        assert!(outcome.reason.unwrap().contains("timed out"));
    }
}
