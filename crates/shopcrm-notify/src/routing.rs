//! Channel-based routing across providers.

use std::sync::Arc;

use async_trait::async_trait;

use shopcrm_entity::notification::{Channel, Destination, Template};

use crate::error::DispatchError;
use crate::notifier::{DispatchResult, Notifier};
use crate::payload::MessagePayload;

/// Routes each channel to the provider registered for it.
#[derive(Debug, Clone, Default)]
pub struct RoutingNotifier {
    email: Option<Arc<dyn Notifier>>,
    sms: Option<Arc<dyn Notifier>>,
}

impl RoutingNotifier {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the email provider.
    pub fn with_email(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.email = Some(notifier);
        self
    }

    /// Register the SMS provider.
    pub fn with_sms(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.sms = Some(notifier);
        self
    }

    /// Name of the provider registered for `channel`.
    pub fn provider_name(&self, channel: Channel) -> Option<&str> {
        self.route(channel).map(|notifier| notifier.name())
    }

    fn route(&self, channel: Channel) -> Option<&Arc<dyn Notifier>> {
        match channel {
            Channel::Email => self.email.as_ref(),
            Channel::Sms => self.sms.as_ref(),
        }
    }
}

#[async_trait]
impl Notifier for RoutingNotifier {
    fn name(&self) -> &str {
        "router"
    }

    fn supports(&self, channel: Channel) -> bool {
        self.route(channel).is_some()
    }

    async fn send(
        &self,
        destination: &Destination,
        channel: Channel,
        template: Template,
        payload: &MessagePayload,
    ) -> DispatchResult {
        let notifier = self
            .route(channel)
            .ok_or(DispatchError::Unsupported(channel))?;
        notifier.send(destination, channel, template, payload).await
    }
}
