//! Application state shared across all request handlers.

use seatline_core::cache::EventViewCache;
use seatline_core::config::CacheConfig;
use seatline_core::engine::{CancellationEngine, EventCatalog, RegistrationEngine};
use seatline_core::events::NotificationPublisher;
use seatline_core::rate_limit::{RateLimitPolicy, RateLimiter};
use seatline_core::store::EventStore;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    /// Cached event reads.
    pub catalog: EventCatalog,
    pub registrations: RegistrationEngine,
    pub cancellations: CancellationEngine,
    /// Process-local request counters.
    pub limiter: RateLimiter,
}

impl AppState {
    /// Wire the engines over one store and one cache.
    ///
    /// Without a publisher, registrations and cancellations emit no
    /// notifications.
    pub fn new(
        store: Arc<dyn EventStore>,
        cache: &CacheConfig,
        policy: RateLimitPolicy,
        publisher: Option<NotificationPublisher>,
    ) -> Self {
        let catalog = EventCatalog::new(
            store.clone(),
            EventViewCache::new(cache.list_ttl, cache.detail_ttl),
        );
        let registrations =
            RegistrationEngine::new(store.clone(), catalog.clone(), publisher.clone());
        let cancellations = CancellationEngine::new(store.clone(), catalog.clone(), publisher);
        Self {
            store,
            catalog,
            registrations,
            cancellations,
            limiter: RateLimiter::new(policy),
        }
    }
}
