//! Job executor that dispatches job requests to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use shopcrm_core::error::AppError;

/// One invocation of a job, produced by a cron tick or a manual trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// Unique id of this invocation, used to correlate log lines.
    pub id: Uuid,
    /// Handler key.
    pub job_type: String,
    /// Handler-specific arguments.
    pub payload: Value,
    /// When the request was created.
    pub triggered_at: DateTime<Utc>,
}

impl JobRequest {
    /// Create a request for `job_type` with `payload`.
    pub fn new(job_type: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_type: job_type.into(),
            payload,
            triggered_at: Utc::now(),
        }
    }
}

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes
    fn job_type(&self) -> &str;

    /// Execute the job with the given payload
    async fn execute(&self, job: &JobRequest) -> Result<Option<Value>, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Will fail again with the same input
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// The next tick may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Dispatches jobs to the appropriate handler based on `job_type`
#[derive(Debug, Default)]
pub struct JobExecutor {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    /// Create an executor with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job handler, replacing any handler for the same type.
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        tracing::info!(job_type = %job_type, "Registered job handler");
        self.handlers.insert(job_type, handler);
    }

    /// Execute a job by dispatching to the correct handler
    pub async fn execute(&self, job: &JobRequest) -> Result<Option<Value>, JobExecutionError> {
        let handler = self.handlers.get(&job.job_type).ok_or_else(|| {
            JobExecutionError::Permanent(format!(
                "No handler registered for job type '{}'",
                job.job_type
            ))
        })?;

        tracing::info!(job_id = %job.id, job_type = %job.job_type, "Executing job");

        handler.execute(job).await
    }

    /// Check if a handler is registered for a job type
    pub fn has_handler(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    /// Registered job types, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Echo;

    #[async_trait]
    impl JobHandler for Echo {
        fn job_type(&self) -> &str {
            "echo"
        }

        async fn execute(&self, job: &JobRequest) -> Result<Option<Value>, JobExecutionError> {
            Ok(Some(job.payload.clone()))
        }
    }

    #[tokio::test]
    async fn test_dispatches_by_type() {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(Echo));

        let job = JobRequest::new("echo", serde_json::json!({"n": 1}));
        let result = executor.execute(&job).await.unwrap();

        assert_eq!(result, Some(serde_json::json!({"n": 1})));
        assert!(executor.has_handler("echo"));
        assert_eq!(executor.registered_types(), vec!["echo".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_type_is_permanent() {
        let executor = JobExecutor::new();
        let err = executor
            .execute(&JobRequest::new("missing", Value::Null))
            .await
            .unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }
}
