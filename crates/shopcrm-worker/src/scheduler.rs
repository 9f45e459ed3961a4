//! Cron scheduler for periodic jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use shopcrm_core::config::ReminderConfig;
use shopcrm_core::error::AppError;

use crate::executor::{JobExecutionError, JobExecutor, JobRequest};
use crate::jobs::ReminderJobHandler;

/// Cron-based scheduler that turns ticks into [`JobRequest`]s.
pub struct CronScheduler {
    scheduler: JobScheduler,
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("handlers", &self.executor.registered_types())
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register the appointment reminder sweep if it is enabled.
    pub async fn register_reminder_sweep(&self, config: &ReminderConfig) -> Result<(), AppError> {
        if !config.enabled {
            tracing::info!("Reminder sweep disabled; not scheduling");
            return Ok(());
        }
        self.register(
            ReminderJobHandler::JOB_TYPE,
            &config.schedule,
            serde_json::Value::Null,
        )
        .await
    }

    /// Fire `job_type` on every tick of the six-field cron `schedule`.
    pub async fn register(
        &self,
        job_type: &str,
        schedule: &str,
        payload: serde_json::Value,
    ) -> Result<(), AppError> {
        if !self.executor.has_handler(job_type) {
            return Err(AppError::configuration(format!(
                "No handler registered for scheduled job '{job_type}'"
            )));
        }

        let executor = Arc::clone(&self.executor);
        let job_key = job_type.to_string();
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let request = JobRequest::new(job_key.clone(), payload.clone());
            Box::pin(async move {
                run_job(&executor, &request).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid schedule '{schedule}' for {job_type}: {e}"
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add {job_type} schedule: {e}"))
        })?;

        tracing::info!(job_type, schedule, "Registered scheduled job");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

/// Execute one request and log its outcome. Errors never escape a tick.
pub(crate) async fn run_job(executor: &JobExecutor, request: &JobRequest) {
    match executor.execute(request).await {
        Ok(result) => {
            tracing::info!(
                job_id = %request.id,
                job_type = %request.job_type,
                result = %result.unwrap_or(serde_json::Value::Null),
                "Scheduled job completed"
            );
        }
        Err(JobExecutionError::Transient(reason)) => {
            tracing::warn!(
                job_id = %request.id,
                job_type = %request.job_type,
                "Scheduled job failed, will run again next tick: {reason}"
            );
        }
        Err(e) => {
            tracing::error!(
                job_id = %request.id,
                job_type = %request.job_type,
                "Scheduled job failed: {e}"
            );
        }
    }
}
