//! Notifier that writes outbound messages to the log instead of delivering them.
//!
//! Backs the `log` provider setting for local development. Only a message
//! counter is kept, so a long-running server holds no per-message state.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use shopcrm_entity::notification::{Channel, Destination, DispatchReceipt, Template};

use crate::error::DispatchError;
use crate::notifier::{DispatchResult, Notifier};
use crate::payload::MessagePayload;

/// Logs each message and hands back a synthetic `log-N` id.
#[derive(Debug)]
pub struct LogNotifier {
    channels: Vec<Channel>,
    counter: AtomicU64,
}

impl LogNotifier {
    /// Log-only notifier for the given channels.
    pub fn for_channels(channels: &[Channel]) -> Self {
        Self {
            channels: channels.to_vec(),
            counter: AtomicU64::new(0),
        }
    }

    /// Messages logged so far.
    pub fn logged(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn supports(&self, channel: Channel) -> bool {
        self.channels.contains(&channel)
    }

    async fn send(
        &self,
        destination: &Destination,
        channel: Channel,
        template: Template,
        payload: &MessagePayload,
    ) -> DispatchResult {
        if !self.supports(channel) {
            return Err(DispatchError::Unsupported(channel));
        }

        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let message_id = format!("log-{seq}");
        info!(
            channel = %channel,
            to = %destination.address,
            template = %template,
            appointment_id = %payload.appointment_id,
            customer = %payload.customer_name,
            local_time = %payload.local_time,
            message_id = %message_id,
            "Outbound message (log provider)"
        );

        Ok(DispatchReceipt {
            channel,
            provider_message_id: Some(message_id),
        })
    }
}
