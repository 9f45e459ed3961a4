//! # shopcrm-notify
//!
//! Notification transports for appointment messages.
//!
//! - [`Notifier`]: the single boundary the scheduler talks to
//! - SendGrid (email) and Twilio (SMS) HTTP providers
//! - [`RoutingNotifier`], which picks the provider for a channel
//! - [`LogNotifier`], which only logs, for local development
//! - [`RecordingNotifier`], which records instead of delivering, for tests

pub mod error;
pub mod factory;
pub mod formatter;
pub mod log;
pub mod notifier;
pub mod payload;
pub mod providers;
pub mod recording;
pub mod routing;

pub use error::DispatchError;
pub use factory::{build_notifier, build_router};
pub use log::LogNotifier;
pub use notifier::{DispatchResult, Notifier};
pub use payload::MessagePayload;
pub use recording::{RecordingNotifier, SentMessage};
pub use routing::RoutingNotifier;
