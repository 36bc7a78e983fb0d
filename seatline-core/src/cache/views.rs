use super::TtlCache;
use crate::entities::event::EventWithCount;
use std::time::{Duration, Instant};

/// Key of the "all events with counts" view.
pub const EVENT_LIST_KEY: &str = "events:with_counts";

/// Substring shared by every event view key.
pub const EVENT_KEY_PATTERN: &str = "event";

pub fn event_detail_key(event_id: &str) -> String {
    format!("event:{event_id}:with_count")
}

/// The two cached event read views and their TTLs.
#[derive(Debug, Clone)]
pub struct EventViewCache {
    lists: TtlCache<Vec<EventWithCount>>,
    details: TtlCache<EventWithCount>,
    list_ttl: Duration,
    detail_ttl: Duration,
}

impl EventViewCache {
    pub fn new(list_ttl: Duration, detail_ttl: Duration) -> Self {
        Self {
            lists: TtlCache::new(),
            details: TtlCache::new(),
            list_ttl,
            detail_ttl,
        }
    }

    pub async fn list_or_load<F, Fut, E>(&self, loader: F) -> Result<Vec<EventWithCount>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<EventWithCount>, E>>,
    {
        let events = self
            .lists
            .get_or_load(EVENT_LIST_KEY, self.list_ttl, || async move {
                loader().await.map(Some)
            })
            .await?;
        Ok(events.unwrap_or_default())
    }

    pub async fn detail_or_load<F, Fut, E>(
        &self,
        event_id: &str,
        loader: F,
    ) -> Result<Option<EventWithCount>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<EventWithCount>, E>>,
    {
        self.details
            .get_or_load(&event_detail_key(event_id), self.detail_ttl, loader)
            .await
    }

    /// Drop the list view and the detail view of one event.
    pub fn invalidate_event(&self, event_id: &str) -> usize {
        self.lists.delete(&[EVENT_LIST_KEY]) + self.details.delete(&[event_detail_key(event_id)])
    }

    /// Drop every event-related key.
    pub fn invalidate_all(&self) -> usize {
        self.lists.invalidate_pattern(EVENT_KEY_PATTERN)
            + self.details.invalidate_pattern(EVENT_KEY_PATTERN)
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        self.lists.sweep_at(now) + self.details.sweep_at(now)
    }

    pub fn len(&self) -> usize {
        self.lists.len() + self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
