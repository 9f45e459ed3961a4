//! SendGrid v3 email provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use shopcrm_core::config::{SendGridConfig, TemplateIds};
use shopcrm_core::error::AppError;
use shopcrm_core::result::AppResult;
use shopcrm_entity::appointment::ReminderKind;
use shopcrm_entity::notification::{Channel, Destination, DispatchReceipt, Template};

use super::excerpt;
use crate::error::DispatchError;
use crate::formatter::MessageFormatter;
use crate::notifier::{DispatchResult, Notifier};
use crate::payload::MessagePayload;

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dynamic_template_data: Option<&'a MessagePayload>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    mime: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct MailSend<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    content: Vec<Content>,
    categories: Vec<&'static str>,
}

/// Sends email through the SendGrid `mail/send` endpoint.
#[derive(Debug, Clone)]
pub struct SendGridNotifier {
    client: reqwest::Client,
    config: SendGridConfig,
    templates: TemplateIds,
}

impl SendGridNotifier {
    /// Create a SendGrid notifier with a per-request timeout.
    pub fn new(config: SendGridConfig, templates: TemplateIds, timeout: Duration) -> AppResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::configuration(
                "notifications.sendgrid.api_key is required for the sendgrid provider",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            templates,
        })
    }

    fn template_id(&self, template: Template) -> Option<&str> {
        let id = match template {
            Template::Reminder(ReminderKind::DayBefore) => &self.templates.reminder_24h,
            Template::Reminder(ReminderKind::TwoHours) => &self.templates.reminder_2h,
            Template::Reminder(ReminderKind::SameDay) => &self.templates.reminder_same_day,
            Template::Confirmation => &self.templates.confirmation,
        };
        id.as_deref().filter(|id| !id.is_empty())
    }

    fn build_request<'a>(
        &'a self,
        destination: &'a Destination,
        template: Template,
        payload: &'a MessagePayload,
    ) -> MailSend<'a> {
        let template_id = self.template_id(template);

        // Without a dynamic template SendGrid needs an explicit body.
        let content = match template_id {
            Some(_) => Vec::new(),
            None => vec![Content {
                mime: "text/plain",
                value: MessageFormatter::body(template, payload),
            }],
        };

        MailSend {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: &destination.address,
                    name: &destination.name,
                }],
                dynamic_template_data: template_id.map(|_| payload),
            }],
            from: Address {
                email: &self.config.from_email,
                name: &self.config.from_name,
            },
            subject: MessageFormatter::subject(template, payload),
            template_id,
            content,
            categories: vec![template.name()],
        }
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    fn name(&self) -> &str {
        "sendgrid"
    }

    fn supports(&self, channel: Channel) -> bool {
        channel == Channel::Email
    }

    async fn send(
        &self,
        destination: &Destination,
        channel: Channel,
        template: Template,
        payload: &MessagePayload,
    ) -> DispatchResult {
        if channel != Channel::Email {
            return Err(DispatchError::Unsupported(channel));
        }

        let url = format!(
            "{}/v3/mail/send",
            self.config.api_base_url.trim_end_matches('/')
        );
        let body = self.build_request(destination, template, payload);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                provider: "sendgrid",
                status: status.as_u16(),
                body: excerpt(&text),
            });
        }

        let provider_message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        debug!(
            template = %template,
            message_id = ?provider_message_id,
            "SendGrid accepted message"
        );

        Ok(DispatchReceipt {
            channel: Channel::Email,
            provider_message_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use chrono::Utc;
    use serde_json::Value;
    use shopcrm_core::types::id::AppointmentId;

    fn payload() -> MessagePayload {
        MessagePayload {
            appointment_id: AppointmentId::new(),
            customer_name: "Jo Kim".to_string(),
            shop_name: "Northside Auto".to_string(),
            scheduled_at: Utc::now(),
            local_time: "Thu Mar 12 at 8:00 AM".to_string(),
            service: Some("Tire rotation".to_string()),
            vehicle: None,
        }
    }

    fn destination() -> Destination {
        Destination {
            name: "Jo Kim".to_string(),
            address: "jo@example.com".to_string(),
        }
    }

    async fn spawn_provider(status: StatusCode, captured: Arc<Mutex<Vec<(HeaderMap, Value)>>>) -> String {
        let app = Router::new().route(
            "/v3/mail/send",
            post(move |headers: HeaderMap, axum::Json(body): axum::Json<Value>| {
                let captured = Arc::clone(&captured);
                async move {
                    captured.lock().unwrap().push((headers, body));
                    let mut out = HeaderMap::new();
                    out.insert("x-message-id", "sg-msg-1".parse().unwrap());
                    (status, out, "")
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn notifier(base_url: String, templates: TemplateIds) -> SendGridNotifier {
        let config = SendGridConfig {
            api_base_url: base_url,
            api_key: "SG.test".to_string(),
            from_email: "service@northside.example".to_string(),
            from_name: "Northside Auto".to_string(),
        };
        SendGridNotifier::new(config, templates, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_send_with_dynamic_template() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let base = spawn_provider(StatusCode::ACCEPTED, Arc::clone(&captured)).await;
        let templates = TemplateIds {
            reminder_24h: Some("d-24h".to_string()),
            ..TemplateIds::default()
        };

        let receipt = notifier(base, templates)
            .send(
                &destination(),
                Channel::Email,
                Template::Reminder(ReminderKind::DayBefore),
                &payload(),
            )
            .await
            .unwrap();

        assert_eq!(receipt.provider_message_id.as_deref(), Some("sg-msg-1"));

        let requests = captured.lock().unwrap();
        let (headers, body) = &requests[0];
        assert_eq!(headers["authorization"], "Bearer SG.test");
        assert_eq!(body["template_id"], "d-24h");
        assert_eq!(body["personalizations"][0]["to"][0]["email"], "jo@example.com");
        assert_eq!(
            body["personalizations"][0]["dynamic_template_data"]["service"],
            "Tire rotation"
        );
        assert!(body.get("content").is_none());
    }

    #[tokio::test]
    async fn test_send_plain_text_without_template() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let base = spawn_provider(StatusCode::ACCEPTED, Arc::clone(&captured)).await;

        notifier(base, TemplateIds::default())
            .send(&destination(), Channel::Email, Template::Confirmation, &payload())
            .await
            .unwrap();

        let requests = captured.lock().unwrap();
        let (_, body) = &requests[0];
        assert_eq!(body["content"][0]["type"], "text/plain");
        assert_eq!(body["categories"][0], "appointment_confirmation");
    }

    #[tokio::test]
    async fn test_rejection_is_reported() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let base = spawn_provider(StatusCode::BAD_REQUEST, captured).await;

        let err = notifier(base, TemplateIds::default())
            .send(&destination(), Channel::Email, Template::Confirmation, &payload())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Rejected { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_sms_is_unsupported() {
        let n = notifier("http://127.0.0.1:9".to_string(), TemplateIds::default());
        let err = n
            .send(&destination(), Channel::Sms, Template::Confirmation, &payload())
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::Unsupported(Channel::Sms));
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let err = SendGridNotifier::new(
            SendGridConfig::default(),
            TemplateIds::default(),
            Duration::from_secs(5),
        )
        .unwrap_err();
        assert_eq!(err.kind, shopcrm_core::error::ErrorKind::Configuration);
    }
}
