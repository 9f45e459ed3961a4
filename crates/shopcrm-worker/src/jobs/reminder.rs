//! Periodic appointment reminder sweep.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing;

use shopcrm_core::error::ErrorKind;
use shopcrm_service::ReminderScheduler;

use crate::executor::{JobExecutionError, JobHandler, JobRequest};

/// Runs `generate_due_reminders` for each tick.
///
/// The payload may carry `{"now": "<RFC 3339>"}` to evaluate at a fixed
/// instant; otherwise the scheduler's clock is used.
#[derive(Debug)]
pub struct ReminderJobHandler {
    scheduler: Arc<ReminderScheduler>,
}

impl ReminderJobHandler {
    /// Job type key.
    pub const JOB_TYPE: &'static str = "appointment_reminders";

    /// Create a new reminder job handler
    pub fn new(scheduler: Arc<ReminderScheduler>) -> Self {
        Self { scheduler }
    }

    fn requested_now(payload: &Value) -> Result<Option<DateTime<Utc>>, JobExecutionError> {
        match payload.get("now") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) => DateTime::parse_from_rfc3339(raw)
                .map(|t| Some(t.with_timezone(&Utc)))
                .map_err(|e| JobExecutionError::Permanent(format!("Invalid 'now' {raw:?}: {e}"))),
            Some(other) => Err(JobExecutionError::Permanent(format!(
                "'now' must be an RFC 3339 string, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl JobHandler for ReminderJobHandler {
    fn job_type(&self) -> &str {
        Self::JOB_TYPE
    }

    async fn execute(&self, job: &JobRequest) -> Result<Option<Value>, JobExecutionError> {
        let report = match Self::requested_now(&job.payload)? {
            Some(now) => self.scheduler.generate_due_reminders(now).await,
            None => self.scheduler.run_now().await,
        }
        .map_err(|e| match e.kind {
            ErrorKind::Database => JobExecutionError::Transient(e.to_string()),
            _ => JobExecutionError::Internal(e),
        })?;

        tracing::debug!(
            job_id = %job.id,
            dispatched = report.dispatched,
            failed = report.failed,
            "Reminder sweep finished"
        );

        Ok(Some(serde_json::json!({
            "task": Self::JOB_TYPE,
            "now": report.now,
            "candidates": report.candidates,
            "dispatched": report.dispatched,
            "failed": report.failed,
            "errored": report.errored(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::TimeZone;
    use shopcrm_core::traits::FixedClock;
    use shopcrm_core::types::id::CustomerId;
    use shopcrm_database::MemoryStore;
    use shopcrm_entity::appointment::Appointment;
    use shopcrm_entity::customer::Customer;
    use shopcrm_notify::RecordingNotifier;
    use shopcrm_service::ReminderPolicy;

    async fn handler_with_one_due() -> (ReminderJobHandler, RecordingNotifier, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap();
        let store = MemoryStore::new();
        let customer = Customer {
            id: CustomerId::new(),
            name: "Robin Hale".to_string(),
            email: Some("robin@example.com".to_string()),
            phone: None,
            created_at: now,
        };
        store.insert_customer(customer.clone()).await;
        store
            .insert_appointment(Appointment::new(customer.id, now + chrono::Duration::hours(6)))
            .await;

        let notifier = RecordingNotifier::new();
        let scheduler = ReminderScheduler::new(
            Arc::new(store.clone()),
            Arc::new(store),
            Arc::new(notifier.clone()),
            Arc::new(FixedClock::new(now)),
            ReminderPolicy::default(),
            Duration::from_secs(5),
            "Shop",
        );
        (ReminderJobHandler::new(Arc::new(scheduler)), notifier, now)
    }

    #[tokio::test]
    async fn test_tick_runs_sweep_at_clock_time() {
        let (handler, notifier, now) = handler_with_one_due().await;

        let result = handler
            .execute(&JobRequest::new(ReminderJobHandler::JOB_TYPE, Value::Null))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result["dispatched"], 1);
        assert_eq!(result["now"], serde_json::to_value(now).unwrap());
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_now_in_payload() {
        let (handler, notifier, now) = handler_with_one_due().await;
        let earlier = now - chrono::Duration::days(2);

        let result = handler
            .execute(&JobRequest::new(
                ReminderJobHandler::JOB_TYPE,
                serde_json::json!({ "now": earlier.to_rfc3339() }),
            ))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result["candidates"], 0);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_now_is_permanent() {
        let (handler, _, _) = handler_with_one_due().await;
        let err = handler
            .execute(&JobRequest::new(
                ReminderJobHandler::JOB_TYPE,
                serde_json::json!({ "now": "yesterday" }),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }
}
