//! Customer entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use shopcrm_core::types::id::CustomerId;

use crate::notification::{Channel, Destination};

/// A shop customer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    /// Unique customer identifier.
    pub id: CustomerId,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number in E.164 format.
    pub phone: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Contact details for notifications.
    pub fn contact(&self) -> CustomerContact {
        CustomerContact {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// The subset of a customer record needed to reach them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CustomerContact {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

impl CustomerContact {
    /// Destination for a channel, if the customer has an address for it.
    ///
    /// Blank strings count as missing.
    pub fn destination_for(&self, channel: Channel) -> Option<Destination> {
        let address = match channel {
            Channel::Email => self.email.as_deref(),
            Channel::Sms => self.phone.as_deref(),
        }?
        .trim();

        if address.is_empty() {
            return None;
        }

        Some(Destination {
            name: self.name.clone(),
            address: address.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_for_channel() {
        let contact = CustomerContact {
            name: "Dana Reyes".to_string(),
            email: Some("dana@example.com".to_string()),
            phone: Some("   ".to_string()),
        };

        let email = contact.destination_for(Channel::Email).unwrap();
        assert_eq!(email.address, "dana@example.com");
        assert_eq!(email.name, "Dana Reyes");
        assert!(contact.destination_for(Channel::Sms).is_none());
    }
}
