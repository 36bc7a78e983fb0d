//! Notification delivery configuration.

use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Recipient of operator notifications. None disables them.
    pub operator_email: Option<String>,
    /// From address used for outgoing mail.
    pub sender: String,
    /// Mail relay endpoint. When unset, notifications are only logged.
    pub relay_url: Option<Url>,
    /// Upper bound on a single delivery attempt.
    pub timeout: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            operator_email: None,
            sender: "no-reply@localhost".to_string(),
            relay_url: None,
            timeout: Duration::from_millis(5000),
        }
    }
}
