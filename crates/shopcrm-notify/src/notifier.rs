//! The notification boundary.

use async_trait::async_trait;

use shopcrm_entity::notification::{Channel, Destination, DispatchReceipt, Template};

use crate::error::DispatchError;
use crate::payload::MessagePayload;

/// Result of a single provider call.
pub type DispatchResult = Result<DispatchReceipt, DispatchError>;

/// Sends one templated message on one channel.
///
/// Implementations own any provider-specific retry or backoff; callers
/// see a single acknowledgement or a single error.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Whether this notifier can deliver on `channel`.
    fn supports(&self, channel: Channel) -> bool;

    /// Deliver `template` rendered with `payload` to `destination`.
    async fn send(
        &self,
        destination: &Destination,
        channel: Channel,
        template: Template,
        payload: &MessagePayload,
    ) -> DispatchResult;
}
