//! Event listing types.

use serde::{Deserialize, Serialize};

/// An event together with its live registration count.
///
/// Timestamps are unix seconds. A `capacity` of zero or less means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub starts_at: i64,
    pub ends_at: i64,
    pub location: String,
    pub capacity: i32,
    pub registration_count: i64,
    pub spots_left: Option<i64>,
}

impl EventResponse {
    /// Whether the event still accepts registrations.
    pub fn has_space(&self) -> bool {
        self.spots_left.is_none_or(|left| left > 0)
    }
}
