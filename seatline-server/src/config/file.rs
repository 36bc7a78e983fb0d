//! TOML file configuration structures.
//!
//! These structs directly map to the `seatline.toml` file format. Every
//! section is optional and falls back to the runtime defaults.

use seatline_core::config::{CacheConfig, Environment, NotificationConfig, RateLimitConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rate_limit: RateLimitSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub notifications: NotificationSection,
    #[serde(default)]
    pub events: Vec<EventSeed>,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    #[serde(default)]
    pub environment: Environment,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            environment: Environment::default(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    seatline_core::config::ServerConfig::default().listen
}

/// `[rate_limit]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    pub per_ip_per_hour: u32,
    pub per_email_per_day: u32,
    pub relaxed: bool,
    pub relaxed_multiplier: u32,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        let defaults = RateLimitConfig::default();
        Self {
            per_ip_per_hour: defaults.per_ip_per_hour,
            per_email_per_day: defaults.per_email_per_day,
            relaxed: defaults.relaxed,
            relaxed_multiplier: defaults.relaxed_multiplier,
        }
    }
}

/// `[cache]` section. Durations are whole seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub list_ttl_secs: u64,
    pub detail_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            list_ttl_secs: defaults.list_ttl.as_secs(),
            detail_ttl_secs: defaults.detail_ttl.as_secs(),
            sweep_interval_secs: defaults.sweep_interval.as_secs(),
        }
    }
}

/// `[notifications]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSection {
    pub operator_email: Option<String>,
    pub sender: String,
    pub relay_url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for NotificationSection {
    fn default() -> Self {
        let defaults = NotificationConfig::default();
        Self {
            operator_email: defaults.operator_email,
            sender: defaults.sender,
            relay_url: None,
            timeout_ms: defaults.timeout.as_millis() as u64,
        }
    }
}

/// One `[[events]]` entry of the seed catalogue.
///
/// Timestamps are RFC 3339 strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: String,
    pub ends_at: String,
    pub location: String,
    /// Zero or negative means unlimited.
    #[serde(default)]
    pub capacity: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"
environment = "development"

[rate_limit]
per_ip_per_hour = 20

[cache]
list_ttl_secs = 120

[notifications]
operator_email = "ops@example.com"
relay_url = "https://mail.example.com/send"

[[events]]
id = "launch-2026"
name = "Launch Night"
starts_at = "2026-11-01T18:00:00Z"
ends_at = "2026-11-01T21:00:00Z"
location = "Lagos"
capacity = 120
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.rate_limit.per_ip_per_hour, 20);
        assert_eq!(config.rate_limit.per_email_per_day, 3);
        assert_eq!(config.cache.list_ttl_secs, 120);
        assert_eq!(config.cache.detail_ttl_secs, 60);
        assert_eq!(config.notifications.timeout_ms, 5000);
        assert_eq!(config.events.len(), 1);
        assert!(config.events[0].active);
        assert_eq!(config.events[0].description, "");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.server.environment, Environment::Production);
        assert_eq!(config.rate_limit.per_ip_per_hour, 10);
        assert!(config.events.is_empty());
    }
}
