//! Event channel factories and handles.

use super::types::NotificationEvent;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Default buffer size for event channels.
///
/// This provides enough buffer to handle bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for NotificationEvent events.
pub type NotificationEventSender = mpsc::Sender<NotificationEvent>;
/// Receiver handle for NotificationEvent events.
pub type NotificationEventReceiver = mpsc::Receiver<NotificationEvent>;

/// Create a new NotificationEvent channel.
///
/// Returns a (sender, receiver) pair for NotificationEvent events.
pub fn notification_event_channel() -> (NotificationEventSender, NotificationEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Non-blocking publisher used by the engines.
#[derive(Debug, Clone)]
pub struct NotificationPublisher {
    tx: NotificationEventSender,
}

impl NotificationPublisher {
    pub fn new(tx: NotificationEventSender) -> Self {
        Self { tx }
    }

    /// Enqueue an event without waiting. Returns whether it was accepted.
    pub fn publish(&self, event: NotificationEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    kind = event.kind(),
                    registration_id = %event.registration().id,
                    "Notification channel full, dropping event"
                );
                false
            }
            Err(TrySendError::Closed(event)) => {
                tracing::warn!(
                    kind = event.kind(),
                    registration_id = %event.registration().id,
                    "Notification channel closed, dropping event"
                );
                false
            }
        }
    }
}
