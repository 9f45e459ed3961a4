//! Delivery channels and destinations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single concrete delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Email delivery.
    Email,
    /// Text message delivery.
    Sms,
}

impl Channel {
    /// Return the channel as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a message goes: an email address or phone number, plus the
/// recipient's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Recipient display name.
    pub name: String,
    /// Email address or phone number, depending on the channel.
    pub address: String,
}
