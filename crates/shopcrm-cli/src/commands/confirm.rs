//! Booking confirmation command.

use clap::Args;

use shopcrm_core::config::AppConfig;
use shopcrm_core::error::AppError;
use shopcrm_core::types::id::AppointmentId;

use crate::output::{self, OutputFormat};

/// Arguments for the confirm command
#[derive(Debug, Args)]
pub struct ConfirmArgs {
    /// Appointment ID
    pub id: String,
}

/// Send a confirmation for one appointment
pub async fn execute(
    args: &ConfirmArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let appointment_id: AppointmentId = args
        .id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid appointment id: {}", args.id)))?;

    let (db, scheduler) = super::connect_scheduler(config).await?;
    let result = scheduler.send_appointment_confirmation(appointment_id).await;
    db.close().await;
    let outcome = result?;

    match format {
        OutputFormat::Json => output::print_json(&outcome),
        OutputFormat::Table => {
            for delivery in &outcome.deliveries {
                let detail = match (&delivery.provider_message_id, &delivery.reason) {
                    (Some(id), _) => format!("sent ({id})"),
                    (None, Some(reason)) => format!("failed: {reason}"),
                    (None, None) => "sent".to_string(),
                };
                output::print_kv(delivery.channel.as_str(), &detail);
            }
            if outcome.success {
                output::print_success("Confirmation sent.");
            } else {
                output::print_warning("Confirmation was not delivered on any channel.");
            }
        }
    }

    Ok(())
}
