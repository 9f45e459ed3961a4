//! Twilio Programmable Messaging SMS provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use shopcrm_core::config::TwilioConfig;
use shopcrm_core::error::AppError;
use shopcrm_core::result::AppResult;
use shopcrm_entity::notification::{Channel, Destination, DispatchReceipt, Template};

use super::excerpt;
use crate::error::DispatchError;
use crate::formatter::MessageFormatter;
use crate::notifier::{DispatchResult, Notifier};
use crate::payload::MessagePayload;

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Sends SMS through the Twilio `Messages` resource.
#[derive(Debug, Clone)]
pub struct TwilioNotifier {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioNotifier {
    /// Create a Twilio notifier with a per-request timeout.
    pub fn new(config: TwilioConfig, timeout: Duration) -> AppResult<Self> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(AppError::configuration(
                "notifications.twilio.account_sid and auth_token are required for the twilio provider",
            ));
        }
        if config.from_number.is_empty() {
            return Err(AppError::configuration(
                "notifications.twilio.from_number is required for the twilio provider",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    fn name(&self) -> &str {
        "twilio"
    }

    fn supports(&self, channel: Channel) -> bool {
        channel == Channel::Sms
    }

    async fn send(
        &self,
        destination: &Destination,
        channel: Channel,
        template: Template,
        payload: &MessagePayload,
    ) -> DispatchResult {
        if channel != Channel::Sms {
            return Err(DispatchError::Unsupported(channel));
        }

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.account_sid
        );
        let body = MessageFormatter::body(template, payload);
        let form = [
            ("To", destination.address.as_str()),
            ("From", self.config.from_number.as_str()),
            ("Body", body.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                provider: "twilio",
                status: status.as_u16(),
                body: excerpt(&text),
            });
        }

        let resource: MessageResource = response.json().await?;
        debug!(template = %template, sid = %resource.sid, "Twilio accepted message");

        Ok(DispatchReceipt {
            channel: Channel::Sms,
            provider_message_id: Some(resource.sid),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Form, Path};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use chrono::Utc;
    use shopcrm_core::types::id::AppointmentId;
    use shopcrm_entity::appointment::ReminderKind;

    type Captured = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

    async fn spawn_provider(status: StatusCode, captured: Captured) -> String {
        let app = Router::new().route(
            "/2010-04-01/Accounts/{sid}/Messages.json",
            post(
                move |Path(sid): Path<String>, Form(form): Form<HashMap<String, String>>| {
                    let captured = Arc::clone(&captured);
                    async move {
                        captured.lock().unwrap().push((sid, form));
                        (status, Json(serde_json::json!({ "sid": "SM0001", "status": "queued" })))
                    }
                },
            ),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn notifier(base_url: String) -> TwilioNotifier {
        TwilioNotifier::new(
            TwilioConfig {
                api_base_url: base_url,
                account_sid: "AC123".to_string(),
                auth_token: "token".to_string(),
                from_number: "+15550001111".to_string(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn payload() -> MessagePayload {
        MessagePayload {
            appointment_id: AppointmentId::new(),
            customer_name: "Mo".to_string(),
            shop_name: "Northside Auto".to_string(),
            scheduled_at: Utc::now(),
            local_time: "Thu Mar 12 at 8:00 AM".to_string(),
            service: None,
            vehicle: None,
        }
    }

    fn destination() -> Destination {
        Destination {
            name: "Mo".to_string(),
            address: "+15550002222".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_form_and_returns_sid() {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let base = spawn_provider(StatusCode::CREATED, Arc::clone(&captured)).await;

        let receipt = notifier(base)
            .send(
                &destination(),
                Channel::Sms,
                Template::Reminder(ReminderKind::TwoHours),
                &payload(),
            )
            .await
            .unwrap();

        assert_eq!(receipt.provider_message_id.as_deref(), Some("SM0001"));
        let requests = captured.lock().unwrap();
        let (sid, form) = &requests[0];
        assert_eq!(sid, "AC123");
        assert_eq!(form["To"], "+15550002222");
        assert_eq!(form["From"], "+15550001111");
        assert!(form["Body"].contains("about 2 hours"));
    }

    #[tokio::test]
    async fn test_server_error_is_transient_rejection() {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let base = spawn_provider(StatusCode::SERVICE_UNAVAILABLE, captured).await;

        let err = notifier(base)
            .send(&destination(), Channel::Sms, Template::Confirmation, &payload())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Rejected { status: 503, .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn test_requires_credentials() {
        assert!(TwilioNotifier::new(TwilioConfig::default(), Duration::from_secs(1)).is_err());
    }
}
