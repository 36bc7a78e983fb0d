use axum::{Json, extract::State};
use seatline_core::engine::{ClearCacheScope, RegistrationError, ValidationError};
use seatline_sdk::objects::{ClearCacheRequest, ClearCacheResponse};

use super::error::ApiError;
use super::extractors::ApiJson;
use crate::state::AppState;

fn scope_of(request: ClearCacheRequest) -> Result<ClearCacheScope, ValidationError> {
    if request.all {
        return Ok(ClearCacheScope::All);
    }
    let ids: Vec<String> = request
        .event_ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        return Err(ValidationError::new(
            "event_ids",
            "provide event_ids or set all to true",
        ));
    }
    Ok(ClearCacheScope::Events(ids))
}

/// `POST /events/clear-cache`
pub async fn clear_cache(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ClearCacheRequest>,
) -> Result<Json<ClearCacheResponse>, ApiError> {
    let scope = scope_of(request).map_err(RegistrationError::from)?;
    let cleared = state.catalog.clear_cache(&scope);
    Ok(Json(ClearCacheResponse { cleared }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_wins_over_event_ids() {
        let request = ClearCacheRequest {
            event_ids: vec!["launch".to_string()],
            all: true,
        };
        assert_eq!(scope_of(request).unwrap(), ClearCacheScope::All);
    }

    #[test]
    fn blank_ids_are_rejected() {
        let request = ClearCacheRequest {
            event_ids: vec![" ".to_string()],
            all: false,
        };
        assert_eq!(scope_of(request).unwrap_err().field, "event_ids");
        assert_eq!(
            scope_of(ClearCacheRequest {
                event_ids: vec![" launch ".to_string()],
                all: false,
            })
            .unwrap(),
            ClearCacheScope::Events(vec!["launch".to_string()])
        );
    }
}
