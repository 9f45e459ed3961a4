//! Email and SMS provider configuration.

use serde::{Deserialize, Serialize};

/// Notification transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Email provider: `"sendgrid"`, `"log"` (log only, no delivery), or `"disabled"`.
    #[serde(default = "default_email_provider")]
    pub email_provider: String,
    /// SMS provider: `"twilio"`, `"log"`, or `"disabled"`.
    #[serde(default = "default_sms_provider")]
    pub sms_provider: String,
    /// Shop name used in message bodies.
    #[serde(default = "default_shop_name")]
    pub shop_name: String,
    /// SendGrid settings.
    #[serde(default)]
    pub sendgrid: SendGridConfig,
    /// Twilio settings.
    #[serde(default)]
    pub twilio: TwilioConfig,
    /// Provider-side template identifiers.
    #[serde(default)]
    pub templates: TemplateIds,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email_provider: default_email_provider(),
            sms_provider: default_sms_provider(),
            shop_name: default_shop_name(),
            sendgrid: SendGridConfig::default(),
            twilio: TwilioConfig::default(),
            templates: TemplateIds::default(),
        }
    }
}

/// SendGrid v3 API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendGridConfig {
    /// API base URL.
    #[serde(default = "default_sendgrid_url")]
    pub api_base_url: String,
    /// API key (set through `SHOPCRM__NOTIFICATIONS__SENDGRID__API_KEY`).
    #[serde(default)]
    pub api_key: String,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_shop_name")]
    pub from_name: String,
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_sendgrid_url(),
            api_key: String::new(),
            from_email: default_from_email(),
            from_name: default_shop_name(),
        }
    }
}

/// Twilio Programmable Messaging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    /// API base URL.
    #[serde(default = "default_twilio_url")]
    pub api_base_url: String,
    /// Account SID.
    #[serde(default)]
    pub account_sid: String,
    /// Auth token.
    #[serde(default)]
    pub auth_token: String,
    /// Sending phone number in E.164 format.
    #[serde(default)]
    pub from_number: String,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_twilio_url(),
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
        }
    }
}

/// SendGrid dynamic template ids, one per message template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateIds {
    /// Template for the 24-hour reminder.
    #[serde(default)]
    pub reminder_24h: Option<String>,
    /// Template for the 2-hour reminder.
    #[serde(default)]
    pub reminder_2h: Option<String>,
    /// Template for the same-day reminder.
    #[serde(default)]
    pub reminder_same_day: Option<String>,
    /// Template for the booking confirmation.
    #[serde(default)]
    pub confirmation: Option<String>,
}

fn default_email_provider() -> String {
    "sendgrid".to_string()
}

fn default_sms_provider() -> String {
    "disabled".to_string()
}

fn default_shop_name() -> String {
    "Auto Repair Shop".to_string()
}

fn default_sendgrid_url() -> String {
    "https://api.sendgrid.com".to_string()
}

fn default_from_email() -> String {
    "service@example.com".to_string()
}

fn default_twilio_url() -> String {
    "https://api.twilio.com".to_string()
}
