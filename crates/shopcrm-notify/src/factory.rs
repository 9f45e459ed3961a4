//! Builds the configured notifier.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use shopcrm_core::config::NotificationConfig;
use shopcrm_core::error::AppError;
use shopcrm_core::result::AppResult;
use shopcrm_entity::notification::Channel;

use crate::notifier::Notifier;
use crate::providers::{SendGridNotifier, TwilioNotifier};
use crate::log::LogNotifier;
use crate::routing::RoutingNotifier;

/// Assemble the notifier the scheduler dispatches through.
pub fn build_notifier(
    config: &NotificationConfig,
    timeout: Duration,
) -> AppResult<Arc<dyn Notifier>> {
    Ok(Arc::new(build_router(config, timeout)?))
}

/// Assemble a [`RoutingNotifier`] from the `notifications` config section.
pub fn build_router(config: &NotificationConfig, timeout: Duration) -> AppResult<RoutingNotifier> {
    let mut router = RoutingNotifier::new();

    match config.email_provider.as_str() {
        "sendgrid" => {
            let sendgrid = SendGridNotifier::new(
                config.sendgrid.clone(),
                config.templates.clone(),
                timeout,
            )?;
            router = router.with_email(Arc::new(sendgrid));
        }
        "log" => {
            router = router.with_email(Arc::new(LogNotifier::for_channels(&[Channel::Email])));
        }
        "disabled" => {}
        other => {
            return Err(AppError::configuration(format!(
                "Unknown email provider '{other}' (expected sendgrid, log, or disabled)"
            )));
        }
    }

    match config.sms_provider.as_str() {
        "twilio" => {
            let twilio = TwilioNotifier::new(config.twilio.clone(), timeout)?;
            router = router.with_sms(Arc::new(twilio));
        }
        "log" => {
            router = router.with_sms(Arc::new(LogNotifier::for_channels(&[Channel::Sms])));
        }
        "disabled" => {}
        other => {
            return Err(AppError::configuration(format!(
                "Unknown SMS provider '{other}' (expected twilio, log, or disabled)"
            )));
        }
    }

    info!(
        email = %config.email_provider,
        sms = %config.sms_provider,
        "Notification providers configured"
    );

    Ok(router)
}
