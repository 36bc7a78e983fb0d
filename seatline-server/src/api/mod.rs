//! HTTP API routes.
//!
//! Public endpoints (`/events/*`) browse the catalogue, register and
//! cancel. `/events/clear-cache` is the operator endpoint for dropping
//! cached event views.

pub mod admin;
pub mod cancel;
pub mod error;
pub mod events;
pub mod extractors;
pub mod register;

use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use seatline_core::engine::RegistrationError;
use seatline_core::rate_limit::RateDecision;

pub use error::ApiError;

/// Largest accepted cancellation body.
pub const CANCEL_BODY_LIMIT: usize = 2 * 1024;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_events))
        .route("/events/register", post(register::register))
        .route(
            "/events/cancel",
            post(cancel::cancel).layer(DefaultBodyLimit::max(CANCEL_BODY_LIMIT)),
        )
        .route("/events/clear-cache", post(admin::clear_cache))
        .route("/events/{id}", get(events::get_event))
}

/// Turn a rejected rate-limit decision into an error.
fn enforce(decision: RateDecision) -> Result<(), ApiError> {
    match (decision.allowed, decision.reason) {
        (false, Some(reason)) => Err(RegistrationError::RateLimited {
            reason,
            retry_after: decision.retry_after.unwrap_or_default(),
        }
        .into()),
        _ => Ok(()),
    }
}
