//! Notification channel, template, and outcome types.

pub mod channel;
pub mod outcome;
pub mod template;

pub use channel::{Channel, Destination};
pub use outcome::{ChannelDelivery, DispatchOutcome, DispatchReceipt};
pub use template::Template;
