//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use shopcrm_service::check_reference_time;

/// Body of `POST /api/reminders/run`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RunRemindersRequest {
    /// Evaluate due-ness at this instant instead of the current time.
    #[validate(custom(function = "validate_reference_time"))]
    pub now: Option<DateTime<Utc>>,
}

fn validate_reference_time(now: &DateTime<Utc>) -> Result<(), ValidationError> {
    if check_reference_time(*now, Utc::now()).is_err() {
        let mut err = ValidationError::new("reference_time");
        err.message = Some("now must be within a year of the current time".into());
        return Err(err);
    }
    Ok(())
}
