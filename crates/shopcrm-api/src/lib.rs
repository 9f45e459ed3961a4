//! # shopcrm-api
//!
//! HTTP trigger for the appointment communication workflow, built on Axum.
//!
//! Exposes a health check, an on-demand reminder sweep, and the booking
//! confirmation endpoint, and maps [`AppError`](shopcrm_core::AppError)
//! to JSON error responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
