//! Cache and sweep timing.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL of the "all events with counts" view.
    pub list_ttl: Duration,
    /// TTL of a single event view.
    pub detail_ttl: Duration,
    /// How often expired cache entries and rate-limit counters are swept.
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            list_ttl: Duration::from_secs(300),
            detail_ttl: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}
