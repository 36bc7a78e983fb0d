//! Configuration module for seatline-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::{EventSeed, FileConfig};
use seatline_core::config::{
    AppConfig, CacheConfig, NotificationConfig, RateLimitConfig, ServerConfig,
};
use seatline_core::engine::validate::validate_email;
use seatline_core::entities::event::Event;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate and convert into the runtime configuration
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    /// Same as [`load`](Self::load) for already-read TOML content.
    pub fn load_str(&self, content: &str) -> Result<AppConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        build_app_config(file_config)
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

fn build_app_config(file: FileConfig) -> Result<AppConfig, ConfigError> {
    let rate = file.rate_limit;
    if rate.per_ip_per_hour == 0 || rate.per_email_per_day == 0 {
        return Err(invalid("rate_limit thresholds must be greater than zero"));
    }
    if rate.relaxed_multiplier == 0 {
        return Err(invalid("rate_limit.relaxed_multiplier must be greater than zero"));
    }

    let cache = file.cache;
    if cache.list_ttl_secs == 0 || cache.detail_ttl_secs == 0 || cache.sweep_interval_secs == 0 {
        return Err(invalid("cache TTLs and sweep interval must be greater than zero"));
    }

    let notifications = file.notifications;
    if notifications.timeout_ms == 0 {
        return Err(invalid("notifications.timeout_ms must be greater than zero"));
    }
    let operator_email = notifications
        .operator_email
        .map(|email| {
            validate_email(&email)
                .map_err(|e| invalid(format!("notifications.operator_email {}", e.message)))
        })
        .transpose()?;
    let relay_url = notifications
        .relay_url
        .map(|url| {
            Url::parse(&url).map_err(|e| invalid(format!("notifications.relay_url: {e}")))
        })
        .transpose()?;

    let mut seen = HashSet::new();
    let mut events = Vec::with_capacity(file.events.len());
    for seed in file.events {
        if !seen.insert(seed.id.clone()) {
            return Err(invalid(format!("duplicate event id {}", seed.id)));
        }
        events.push(convert_event(seed)?);
    }

    Ok(AppConfig {
        server: ServerConfig {
            listen: file.server.listen,
            environment: file.server.environment,
        },
        rate_limit: RateLimitConfig {
            per_ip_per_hour: rate.per_ip_per_hour,
            per_email_per_day: rate.per_email_per_day,
            relaxed: rate.relaxed,
            relaxed_multiplier: rate.relaxed_multiplier,
        },
        cache: CacheConfig {
            list_ttl: Duration::from_secs(cache.list_ttl_secs),
            detail_ttl: Duration::from_secs(cache.detail_ttl_secs),
            sweep_interval: Duration::from_secs(cache.sweep_interval_secs),
        },
        notifications: NotificationConfig {
            operator_email,
            sender: notifications.sender,
            relay_url,
            timeout: Duration::from_millis(notifications.timeout_ms),
        },
        events,
    })
}

fn convert_event(seed: EventSeed) -> Result<Event, ConfigError> {
    let id = seed.id.trim().to_string();
    if id.is_empty() {
        return Err(invalid("event id must not be empty"));
    }
    let parse = |field: &str, value: &str| {
        OffsetDateTime::parse(value, &Rfc3339)
            .map_err(|e| invalid(format!("event {id}: invalid {field} {value:?}: {e}")))
    };
    let starts_at = parse("starts_at", &seed.starts_at)?;
    let ends_at = parse("ends_at", &seed.ends_at)?;
    if ends_at < starts_at {
        return Err(invalid(format!("event {id}: ends_at is before starts_at")));
    }

    Ok(Event {
        id,
        name: seed.name,
        description: seed.description,
        starts_at,
        ends_at,
        location: seed.location,
        capacity: seed.capacity,
        active: seed.active,
    })
}

/// Get the database URL from the environment, if set.
pub fn get_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())
}
