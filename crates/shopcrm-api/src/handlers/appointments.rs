//! Appointment confirmation handler.

use axum::Json;
use axum::extract::{Path, State};

use shopcrm_core::error::AppError;
use shopcrm_core::types::id::AppointmentId;

use crate::dto::response::{ApiResponse, ConfirmationResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/appointments/{id}/confirmation
///
/// Each call sends another confirmation.
pub async fn send_confirmation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ConfirmationResponse>>> {
    let appointment_id: AppointmentId = id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid appointment id: {id}")))?;

    let outcome = state
        .scheduler
        .send_appointment_confirmation(appointment_id)
        .await?;

    Ok(Json(ApiResponse::ok(ConfirmationResponse {
        appointment_id,
        outcome,
    })))
}
