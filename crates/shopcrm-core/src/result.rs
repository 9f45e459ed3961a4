//! Convenience result type alias for ShopCRM.

use crate::error::AppError;

/// A specialized `Result` type for ShopCRM operations.
pub type AppResult<T> = Result<T, AppError>;
