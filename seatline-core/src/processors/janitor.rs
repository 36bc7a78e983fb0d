//! Janitor processor.
//!
//! Periodically evicts expired cache entries and elapsed rate-limit
//! counters so memory stays bounded without relying on access.

use crate::cache::EventViewCache;
use crate::rate_limit::RateLimiter;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info};

pub struct Janitor {
    cache: EventViewCache,
    limiter: RateLimiter,
    interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl Janitor {
    pub fn new(
        cache: EventViewCache,
        limiter: RateLimiter,
        interval: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            cache,
            limiter,
            interval,
            shutdown_rx,
        }
    }

    /// One sweep pass. Returns (cache entries, rate-limit counters) removed.
    pub fn sweep(&self) -> (usize, usize) {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> (usize, usize) {
        let cache_removed = self.cache.sweep_at(now);
        let counters_removed = self.limiter.sweep_at(now);
        if cache_removed > 0 || counters_removed > 0 {
            debug!(cache_removed, counters_removed, "Janitor sweep");
        }
        (cache_removed, counters_removed)
    }

    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Janitor started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("Janitor received shutdown signal");
                        break;
                    }
                }

                _ = ticker.tick() => {
                    self.sweep();
                }
            }
        }

        info!("Janitor shutdown complete");
    }
}
