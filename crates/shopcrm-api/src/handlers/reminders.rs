//! On-demand reminder sweep.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use validator::Validate;

use shopcrm_core::error::AppError;
use shopcrm_service::BatchReport;

use crate::dto::request::RunRemindersRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/reminders/run
///
/// An empty body runs at the scheduler's current time.
pub async fn run_reminders(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ApiResponse<BatchReport>>> {
    let request = parse_body(&body)?;
    request
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;

    let report = match request.now {
        Some(now) => state.scheduler.generate_due_reminders(now).await?,
        None => state.scheduler.run_now().await?,
    };

    tracing::info!(
        dispatched = report.dispatched,
        failed = report.failed,
        "Manual reminder run finished"
    );

    Ok(Json(ApiResponse::ok(report)))
}

fn parse_body(body: &[u8]) -> Result<RunRemindersRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunRemindersRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))
}
