//! Error body returned by every failing endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable code, e.g. `EventAtCapacity`.
    pub error: String,
    /// Short human-readable reason.
    pub message: String,
}
