//! Route definitions, mounted under `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router and thread `state` through every route.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(reminder_routes())
        .merge(appointment_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

fn reminder_routes() -> Router<AppState> {
    Router::new().route("/reminders/run", post(handlers::reminders::run_reminders))
}

fn appointment_routes() -> Router<AppState> {
    Router::new().route(
        "/appointments/{id}/confirmation",
        post(handlers::appointments::send_confirmation),
    )
}
