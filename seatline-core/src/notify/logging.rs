use super::{Notification, Notifier, NotifyError};
use async_trait::async_trait;

/// Writes notifications to the log instead of sending them.
///
/// Used when no mail relay is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            kind = notification.kind.as_str(),
            to = %notification.to,
            subject = %notification.subject,
            "Notification (log transport)"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
