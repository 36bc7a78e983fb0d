use axum::{Json, extract::State, http::StatusCode};
use seatline_sdk::objects::{RegisterRequest, RegistrationResponse};

use super::error::ApiError;
use super::extractors::{ApiJson, ClientIp};
use crate::state::AppState;

/// `POST /events/register`
///
/// Rate limits are counted before validation so that malformed floods are
/// throttled too.
pub async fn register(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
    super::enforce(state.limiter.check_registration(&ip, &request.email))?;

    let event_id = request.event_id.clone();
    let registration = state
        .registrations
        .register(&event_id, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(registration.to_response())))
}
