//! Dispatch receipts and outcomes.

use serde::{Deserialize, Serialize};

use super::channel::Channel;

/// Provider acknowledgement of a single accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReceipt {
    /// Channel the message went out on.
    pub channel: Channel,
    /// Provider-assigned message id, when the provider returns one.
    pub provider_message_id: Option<String>,
}

/// Result of one channel within a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDelivery {
    /// Channel attempted.
    pub channel: Channel,
    /// Whether the provider accepted the message.
    pub success: bool,
    /// Provider-assigned message id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    /// Failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Aggregate result of sending one message through a channel preference.
///
/// A dispatch succeeds when at least one channel accepted the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Whether any channel accepted the message.
    pub success: bool,
    /// First provider message id returned, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    /// Combined failure reasons when nothing was accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Per-channel detail.
    pub deliveries: Vec<ChannelDelivery>,
}

impl DispatchOutcome {
    /// Build an outcome from per-channel results.
    pub fn from_deliveries(deliveries: Vec<ChannelDelivery>) -> Self {
        let success = deliveries.iter().any(|d| d.success);
        let provider_message_id = deliveries
            .iter()
            .find_map(|d| d.provider_message_id.clone());

        let reason = if success {
            None
        } else if deliveries.is_empty() {
            Some("No delivery channel available".to_string())
        } else {
            Some(
                deliveries
                    .iter()
                    .filter_map(|d| d.reason.as_ref().map(|r| format!("{}: {}", d.channel, r)))
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        };

        Self {
            success,
            provider_message_id,
            reason,
            deliveries,
        }
    }
}
