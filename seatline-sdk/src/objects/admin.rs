//! Operator endpoint types.

use serde::{Deserialize, Serialize};

/// Request body for `POST /events/clear-cache`.
///
/// `all = true` clears every event-related view; otherwise only the views of
/// the listed events (and the shared event list) are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCacheRequest {
    #[serde(default)]
    pub event_ids: Vec<String>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    /// Number of cache entries removed.
    pub cleared: usize,
}
