//! Outbound notifications for registration changes.
//!
//! Delivery is best-effort: every attempt is bounded by a timeout, its
//! outcome is logged, and nothing is retried or propagated to the request
//! that triggered it.

mod logging;
mod relay;

pub use logging::LogNotifier;
pub use relay::HttpRelayNotifier;

use crate::config::NotificationConfig;
use crate::events::NotificationEvent;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("relay rejected notification with status {status}: {body}")]
    DeliveryFailed { status: u16, body: String },

    #[error("notification rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OperatorRegistration,
    UserConfirmation,
    OperatorCancellation,
    UserCancellation,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::OperatorRegistration => "operator_registration",
            NotificationKind::UserConfirmation => "user_confirmation",
            NotificationKind::OperatorCancellation => "operator_cancellation",
            NotificationKind::UserCancellation => "user_cancellation",
        }
    }
}

/// A single message to one recipient.
///
/// `data` carries the fields a mail template needs; rendering happens on
/// the relay side.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub to: String,
    pub subject: String,
    pub data: serde_json::Value,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    fn name(&self) -> &'static str;
}

/// Pick the notifier for the configured transport.
pub fn notifier_from_config(config: &NotificationConfig) -> Arc<dyn Notifier> {
    match &config.relay_url {
        Some(url) => Arc::new(HttpRelayNotifier::new(url.clone(), config.sender.clone())),
        None => Arc::new(LogNotifier),
    }
}

/// Expand an event into the operator notification (when an operator
/// address is configured) and the attendee's own message.
pub fn notifications_for(event: &NotificationEvent, operator_email: Option<&str>) -> Vec<Notification> {
    let registration = event.registration();
    let mut data = serde_json::json!({ "registration": registration.to_response() });
    let (operator_kind, user_kind, operator_subject, user_subject) = match event {
        NotificationEvent::Registered { event_name, .. } => {
            data["event_name"] = serde_json::Value::String(event_name.clone());
            (
                NotificationKind::OperatorRegistration,
                NotificationKind::UserConfirmation,
                format!("New registration for {event_name}: {}", registration.name),
                format!("You're registered for {event_name}"),
            )
        }
        NotificationEvent::Cancelled { .. } => (
            NotificationKind::OperatorCancellation,
            NotificationKind::UserCancellation,
            format!(
                "Registration cancelled: {} ({})",
                registration.name, registration.ticket_number
            ),
            "Your registration has been cancelled".to_string(),
        ),
    };

    let mut out = Vec::with_capacity(2);
    if let Some(operator) = operator_email {
        out.push(Notification {
            kind: operator_kind,
            to: operator.to_string(),
            subject: operator_subject,
            data: data.clone(),
        });
    }
    out.push(Notification {
        kind: user_kind,
        to: registration.email.clone(),
        subject: user_subject,
        data,
    });
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
    TimedOut,
}

/// Send one notification under `timeout` and log the outcome.
pub async fn dispatch(
    notifier: &dyn Notifier,
    notification: &Notification,
    timeout: Duration,
) -> DeliveryOutcome {
    let started = Instant::now();
    let outcome = match tokio::time::timeout(timeout, notifier.send(notification)).await {
        Ok(Ok(())) => DeliveryOutcome::Delivered,
        Ok(Err(e)) => DeliveryOutcome::Failed(e.to_string()),
        Err(_) => DeliveryOutcome::TimedOut,
    };
    let duration_ms = started.elapsed().as_millis() as u64;

    match &outcome {
        DeliveryOutcome::Delivered => tracing::info!(
            kind = notification.kind.as_str(),
            notifier = notifier.name(),
            duration_ms,
            "Notification delivered"
        ),
        DeliveryOutcome::Failed(error) => tracing::warn!(
            kind = notification.kind.as_str(),
            notifier = notifier.name(),
            duration_ms,
            error = %error,
            "Notification delivery failed"
        ),
        DeliveryOutcome::TimedOut => tracing::warn!(
            kind = notification.kind.as_str(),
            notifier = notifier.name(),
            timeout_ms = timeout.as_millis() as u64,
            "Notification delivery timed out"
        ),
    }
    outcome
}


#[cfg(test)]
mod tests {
    use super::testing::{RecordingNotifier, registration};
    use super::*;

    #[test]
    fn registered_event_expands_to_operator_and_user() {
        let event = NotificationEvent::Registered {
            registration: registration(),
            event_name: "Launch Night".to_string(),
        };
        let out = notifications_for(&event, Some("ops@example.com"));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, NotificationKind::OperatorRegistration);
        assert_eq!(out[0].to, "ops@example.com");
        assert_eq!(out[1].kind, NotificationKind::UserConfirmation);
        assert_eq!(out[1].to, "ada@example.com");
        assert_eq!(out[1].data["event_name"], "Launch Night");
        assert_eq!(
            out[1].data["registration"]["ticket_number"],
            "TKT-0000000ZZ-ABCDEFGH-A1B2C3"
        );
    }

    #[test]
    fn operator_message_is_skipped_without_operator_address() {
        let event = NotificationEvent::Cancelled {
            registration: registration(),
        };
        let out = notifications_for(&event, None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, NotificationKind::UserCancellation);
    }

    #[tokio::test]
    async fn dispatch_reports_failure_and_timeout() {
        let notifier = RecordingNotifier {
            fail_kinds: vec![NotificationKind::OperatorRegistration],
            stall_kinds: vec![NotificationKind::UserConfirmation],
            ..Default::default()
        };
        let event = NotificationEvent::Registered {
            registration: registration(),
            event_name: "Launch Night".to_string(),
        };
        let out = notifications_for(&event, Some("ops@example.com"));
        let timeout = Duration::from_millis(50);

        assert!(matches!(
            dispatch(&notifier, &out[0], timeout).await,
            DeliveryOutcome::Failed(_)
        ));
        assert_eq!(
            dispatch(&notifier, &out[1], timeout).await,
            DeliveryOutcome::TimedOut
        );
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn log_notifier_is_the_default_transport() {
        let notifier = notifier_from_config(&NotificationConfig::default());
        assert_eq!(notifier.name(), "log");
    }
}
