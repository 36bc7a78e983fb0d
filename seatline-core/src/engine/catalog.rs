use super::error::RegistrationError;
use crate::cache::EventViewCache;
use crate::entities::event::EventWithCount;
use crate::store::EventStore;
use std::sync::Arc;

/// Which cached views an operator wants dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearCacheScope {
    Events(Vec<String>),
    All,
}

/// Cached read paths over the event catalogue.
#[derive(Clone)]
pub struct EventCatalog {
    store: Arc<dyn EventStore>,
    cache: EventViewCache,
}

impl EventCatalog {
    pub fn new(store: Arc<dyn EventStore>, cache: EventViewCache) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &EventViewCache {
        &self.cache
    }

    /// Active events with counts. A store failure yields an empty list.
    pub async fn list(&self) -> Vec<EventWithCount> {
        match self
            .cache
            .list_or_load(|| self.store.list_events_with_counts())
            .await
        {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load event list, serving empty list");
                Vec::new()
            }
        }
    }

    /// One active event with its count. A store failure reads as not found.
    pub async fn get(&self, event_id: &str) -> Result<EventWithCount, RegistrationError> {
        let event = match self
            .cache
            .detail_or_load(event_id, || self.store.get_event_with_count(event_id))
            .await
        {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(event_id, error = %e, "Failed to load event, serving not found");
                None
            }
        };
        match event {
            Some(event) if event.event.active => Ok(event),
            _ => Err(RegistrationError::EventNotFound),
        }
    }

    /// Drop the views touched by a registration change on `event_id`.
    pub fn invalidate_event(&self, event_id: &str) -> usize {
        self.cache.invalidate_event(event_id)
    }

    /// Returns the number of cache keys removed.
    pub fn clear_cache(&self, scope: &ClearCacheScope) -> usize {
        let cleared = match scope {
            ClearCacheScope::All => self.cache.invalidate_all(),
            ClearCacheScope::Events(ids) => {
                ids.iter().map(|id| self.cache.invalidate_event(id)).sum()
            }
        };
        tracing::info!(scope = ?scope, cleared, "Event cache cleared");
        cleared
    }
}
