//! Configuration types for seatline.
//!
//! These types represent the validated runtime configuration used by the server
//! and can be shared across crates. The actual config loading/parsing is handled
//! by the server crate.

mod cache;
mod notifications;
mod rate_limit;
mod server;

pub use cache::CacheConfig;
pub use notifications::NotificationConfig;
pub use rate_limit::RateLimitConfig;
pub use server::{Environment, ServerConfig};

use crate::entities::event::Event;

/// The complete runtime configuration, assembled once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub notifications: NotificationConfig,
    /// Seed catalogue upserted into the store at startup.
    pub events: Vec<Event>,
}

impl AppConfig {
    /// Rate-limit thresholds after applying relaxed mode.
    pub fn rate_limit_policy(&self) -> crate::rate_limit::RateLimitPolicy {
        self.rate_limit.policy(self.server.environment)
    }
}
