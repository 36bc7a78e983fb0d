use axum::{Json, extract::State};
use seatline_core::engine::{CancelTarget, RegistrationError};
use seatline_sdk::objects::{CancelRequest, CancelResponse};

use super::error::ApiError;
use super::extractors::{ApiJson, ClientIp};
use crate::state::AppState;

/// `POST /events/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ApiJson(request): ApiJson<CancelRequest>,
) -> Result<Json<CancelResponse>, ApiError> {
    super::enforce(state.limiter.check_cancellation(&ip))?;

    let target = CancelTarget::from_parts(request.ticket_number.as_deref(), request.email.as_deref())
        .map_err(RegistrationError::from)?;
    let registration = state.cancellations.cancel(target).await?;

    Ok(Json(CancelResponse {
        message: "Registration cancelled".to_string(),
        ticket_number: registration.ticket_number,
        event_id: registration.event_id,
    }))
}
