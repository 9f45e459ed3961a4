//! Appointment reminder scheduler and confirmation sender.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use shopcrm_core::config::{NotificationConfig, ReminderConfig};
use shopcrm_core::error::AppError;
use shopcrm_core::result::AppResult;
use shopcrm_core::traits::Clock;
use shopcrm_core::types::id::AppointmentId;
use shopcrm_database::{AppointmentStore, CustomerStore, MarkOutcome};
use shopcrm_entity::appointment::{Appointment, AppointmentStatus, ReminderKind};
use shopcrm_entity::customer::CustomerContact;
use shopcrm_entity::notification::{DispatchOutcome, Template};
use shopcrm_notify::{MessagePayload, Notifier};

use crate::dispatch::Dispatcher;

use super::policy::ReminderPolicy;
use super::report::{AppointmentReport, BatchReport, DueReminder};

/// Decides which reminders are due, sends them, and records each sent
/// kind so it is never repeated.
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    appointments: Arc<dyn AppointmentStore>,
    customers: Arc<dyn CustomerStore>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
    policy: ReminderPolicy,
    shop_name: String,
    /// Held for the whole of a run so runs never overlap in this process.
    run_lock: Arc<Mutex<()>>,
}

impl ReminderScheduler {
    /// Create a scheduler with an explicit policy.
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        customers: Arc<dyn CustomerStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        policy: ReminderPolicy,
        dispatch_timeout: Duration,
        shop_name: impl Into<String>,
    ) -> Self {
        Self {
            appointments,
            customers,
            dispatcher: Dispatcher::new(notifier, dispatch_timeout),
            clock,
            policy,
            shop_name: shop_name.into(),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create a scheduler from the `reminders` and `notifications` config sections.
    pub fn from_config(
        appointments: Arc<dyn AppointmentStore>,
        customers: Arc<dyn CustomerStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        reminders: &ReminderConfig,
        notifications: &NotificationConfig,
    ) -> AppResult<Self> {
        let policy = ReminderPolicy::from_config(reminders)?;
        Ok(Self::new(
            appointments,
            customers,
            notifier,
            clock,
            policy,
            Duration::from_secs(reminders.dispatch_timeout_seconds),
            notifications.shop_name.clone(),
        ))
    }

    /// Run a sweep at the clock's current time.
    pub async fn run_now(&self) -> AppResult<BatchReport> {
        self.generate_due_reminders(self.clock.now()).await
    }

    /// Send every reminder due at `now` and record what went out.
    ///
    /// Per-appointment failures are captured in the report; only a failed
    /// candidate query fails the run.
    pub async fn generate_due_reminders(&self, now: DateTime<Utc>) -> AppResult<BatchReport> {
        let _guard = self.run_lock.lock().await;

        let candidates = self.candidates(now).await?;
        let mut batch = BatchReport::new(now, candidates.len());

        for appointment in &candidates {
            if let Some(report) = self.process_appointment(appointment, now).await {
                batch.push(report);
            }
        }

        info!(
            now = %now,
            candidates = batch.candidates,
            dispatched = batch.dispatched,
            failed = batch.failed,
            errored = batch.errored(),
            "Reminder run complete"
        );

        Ok(batch)
    }

    /// Reminders a run at `now` would send, without sending anything.
    pub async fn preview(&self, now: DateTime<Utc>) -> AppResult<Vec<DueReminder>> {
        let candidates = self.candidates(now).await?;

        Ok(candidates
            .iter()
            .flat_map(|appointment| {
                self.policy
                    .due_reminders(appointment, now)
                    .into_iter()
                    .map(move |kind| DueReminder {
                        appointment_id: appointment.id,
                        customer_id: appointment.customer_id,
                        scheduled_at: appointment.scheduled_at,
                        kind,
                        channel: appointment.reminder_settings.preferred_channel,
                    })
            })
            .collect())
    }

    /// Send a booking confirmation for one appointment.
    ///
    /// Confirmations are not deduplicated: each call dispatches again. A
    /// provider failure is reported in the outcome rather than as an error.
    pub async fn send_appointment_confirmation(
        &self,
        appointment_id: AppointmentId,
    ) -> AppResult<DispatchOutcome> {
        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Appointment {appointment_id} not found")))?;

        let contact = self
            .customers
            .find_contact(appointment.customer_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Customer {} for appointment {appointment_id} not found",
                    appointment.customer_id
                ))
            })?;

        let payload = self.payload(&appointment, &contact);
        let outcome = self
            .dispatcher
            .dispatch(
                &contact,
                appointment.reminder_settings.preferred_channel,
                Template::Confirmation,
                &payload,
            )
            .await;

        if outcome.success {
            info!(appointment_id = %appointment_id, "Confirmation sent");
        } else {
            warn!(
                appointment_id = %appointment_id,
                reason = outcome.reason.as_deref().unwrap_or("unknown"),
                "Confirmation not delivered"
            );
        }

        Ok(outcome)
    }

    async fn candidates(&self, now: DateTime<Utc>) -> AppResult<Vec<Appointment>> {
        let before = now + ReminderKind::max_lead();
        self.appointments
            .find_upcoming(&AppointmentStatus::ACTIVE, now, before)
            .await
            .map_err(|e| {
                error!(error = %e, "Reminder candidate query failed");
                e
            })
    }

    async fn process_appointment(
        &self,
        appointment: &Appointment,
        now: DateTime<Utc>,
    ) -> Option<AppointmentReport> {
        let due = self.policy.due_reminders(appointment, now);
        if due.is_empty() {
            return None;
        }

        let mut report = AppointmentReport::new(appointment.id);

        let contact = match self.customers.find_contact(appointment.customer_id).await {
            Ok(Some(contact)) => contact,
            Ok(None) => {
                warn!(
                    appointment_id = %appointment.id,
                    customer_id = %appointment.customer_id,
                    "Customer missing; skipping reminders"
                );
                report.error = Some(format!("Customer {} not found", appointment.customer_id));
                return Some(report);
            }
            Err(e) => {
                error!(appointment_id = %appointment.id, error = %e, "Customer lookup failed");
                report.error = Some(e.to_string());
                return Some(report);
            }
        };

        let payload = self.payload(appointment, &contact);
        let preference = appointment.reminder_settings.preferred_channel;

        for kind in due {
            report.attempted.push(kind);

            let outcome = self
                .dispatcher
                .dispatch(&contact, preference, Template::Reminder(kind), &payload)
                .await;

            if !outcome.success {
                let reason = outcome
                    .reason
                    .unwrap_or_else(|| "dispatch failed".to_string());
                report.fail(kind, reason);
                continue;
            }

            match self.appointments.mark_reminder_sent(appointment.id, kind).await {
                Ok(MarkOutcome::Marked) => {
                    info!(appointment_id = %appointment.id, kind = %kind, "Reminder sent");
                    report.sent.push(kind);
                }
                Ok(MarkOutcome::AlreadySent) => {
                    warn!(
                        appointment_id = %appointment.id,
                        kind = %kind,
                        "Reminder was recorded by another run while sending"
                    );
                    report.sent.push(kind);
                }
                Ok(MarkOutcome::NotFound) => {
                    warn!(
                        appointment_id = %appointment.id,
                        kind = %kind,
                        "Appointment removed while sending reminder"
                    );
                    report.sent.push(kind);
                    break;
                }
                Err(e) => {
                    error!(
                        appointment_id = %appointment.id,
                        kind = %kind,
                        error = %e,
                        "Failed to record sent reminder"
                    );
                    report.fail(kind, format!("delivered but not recorded: {}", e.message));
                    report.error = Some(e.to_string());
                    break;
                }
            }
        }

        Some(report)
    }

    fn payload(&self, appointment: &Appointment, contact: &CustomerContact) -> MessagePayload {
        MessagePayload::for_appointment(appointment, contact, &self.shop_name, self.policy.offset())
    }
}
