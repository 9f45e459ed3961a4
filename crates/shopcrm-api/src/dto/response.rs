//! Response DTOs.

use serde::{Deserialize, Serialize};

use shopcrm_core::types::id::AppointmentId;
use shopcrm_entity::notification::DispatchOutcome;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" when the process answers.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Result of a confirmation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    /// Appointment confirmed.
    pub appointment_id: AppointmentId,
    /// Dispatch result; `success` is false when no provider accepted it.
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}
