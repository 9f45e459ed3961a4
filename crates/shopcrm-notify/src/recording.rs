//! Notifier that records messages instead of delivering them.
//!
//! Lets tests observe exactly what was dispatched and script provider
//! failures. Every accepted message is kept, so it is never wired into the
//! server; the `log` provider uses [`crate::LogNotifier`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use shopcrm_entity::notification::{Channel, Destination, DispatchReceipt, Template};

use crate::error::DispatchError;
use crate::notifier::{DispatchResult, Notifier};
use crate::payload::MessagePayload;

/// A message accepted by a [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentMessage {
    /// Channel used.
    pub channel: Channel,
    /// Recipient.
    pub destination: Destination,
    /// Template sent.
    pub template: Template,
    /// Rendered variables.
    pub payload: MessagePayload,
    /// Synthetic provider id.
    pub message_id: String,
}

#[derive(Debug, Default)]
struct Recorder {
    sent: Vec<SentMessage>,
    scripted_failures: VecDeque<DispatchError>,
    failing: Option<DispatchError>,
    attempts: usize,
}

/// In-process notifier for tests. Clones share state.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    channels: Vec<Channel>,
    state: Arc<Mutex<Recorder>>,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingNotifier {
    /// Recorder accepting both email and SMS.
    pub fn new() -> Self {
        Self::for_channels(&[Channel::Email, Channel::Sms])
    }

    /// Recorder accepting only the given channels.
    pub fn for_channels(channels: &[Channel]) -> Self {
        Self {
            channels: channels.to_vec(),
            state: Arc::new(Mutex::new(Recorder::default())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorder> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fail the next call with `error`. Calls queue up in order.
    pub fn fail_next(&self, error: DispatchError) {
        self.lock().scripted_failures.push_back(error);
    }

    /// Fail every call with `error` until [`RecordingNotifier::recover`].
    pub fn fail_always(&self, error: DispatchError) {
        self.lock().failing = Some(error);
    }

    /// Stop failing calls.
    pub fn recover(&self) {
        let mut state = self.lock();
        state.failing = None;
        state.scripted_failures.clear();
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    /// Number of calls made, successful or not.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
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

        let mut state = self.lock();
        state.attempts += 1;

        if let Some(err) = state.scripted_failures.pop_front() {
            return Err(err);
        }
        if let Some(err) = &state.failing {
            return Err(err.clone());
        }

        let message_id = format!("rec-{}", state.sent.len() + 1);
        info!(
            channel = %channel,
            to = %destination.address,
            template = %template,
            appointment_id = %payload.appointment_id,
            message_id = %message_id,
            "Recorded outbound message"
        );

        state.sent.push(SentMessage {
            channel,
            destination: destination.clone(),
            template,
            payload: payload.clone(),
            message_id: message_id.clone(),
        });

        Ok(DispatchReceipt {
            channel,
            provider_message_id: Some(message_id),
        })
    }
}
