use axum::{
    Json,
    extract::{Path, State},
};
use seatline_sdk::objects::EventResponse;

use super::error::ApiError;
use crate::state::AppState;

/// `GET /events`. Always succeeds; a failing store yields an empty list.
pub async fn list_events(State(state): State<AppState>) -> Json<Vec<EventResponse>> {
    let events = state.catalog.list().await;
    Json(events.iter().map(|e| e.to_response()).collect())
}

/// `GET /events/{id}`
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state.catalog.get(&id).await?;
    Ok(Json(event.to_response()))
}
