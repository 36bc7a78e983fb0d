//! NotificationSender processor.
//!
//! The NotificationSender is responsible for:
//! - Receiving `NotificationEvent` from the queue
//! - Expanding each event into the operator and attendee notifications
//! - Delivering them concurrently, each bounded by the configured timeout
//! - Logging every outcome; failures are never retried or propagated
//!
//! In-flight deliveries are drained before `run` returns.

use crate::config::NotificationConfig;
use crate::events::{NotificationEvent, NotificationEventReceiver};
use crate::notify::{Notifier, dispatch, notifications_for};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub struct NotificationSender {
    notifier: Arc<dyn Notifier>,
    config: NotificationConfig,
    event_rx: NotificationEventReceiver,
    shutdown_rx: watch::Receiver<bool>,
    in_flight: JoinSet<()>,
}

impl NotificationSender {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        config: NotificationConfig,
        event_rx: NotificationEventReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            notifier,
            config,
            event_rx,
            shutdown_rx,
            in_flight: JoinSet::new(),
        }
    }

    /// Run the NotificationSender.
    pub async fn run(mut self) {
        info!(notifier = self.notifier.name(), "NotificationSender started");

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("NotificationSender received shutdown signal");
                        break;
                    }
                }

                event = self.event_rx.recv() => {
                    let Some(event) = event else {
                        info!("NotificationEvent channel closed");
                        break;
                    };
                    debug!(kind = event.kind(), registration_id = %event.registration().id, "Received NotificationEvent");
                    self.spawn_delivery(event);
                }

                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "Notification task failed");
                    }
                }
            }
        }

        while let Some(joined) = self.in_flight.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Notification task failed");
            }
        }

        info!("NotificationSender shutdown complete");
    }

    fn spawn_delivery(&mut self, event: NotificationEvent) {
        let notifications = notifications_for(&event, self.config.operator_email.as_deref());
        for notification in notifications {
            let notifier = self.notifier.clone();
            let timeout = self.config.timeout;
            self.in_flight.spawn(async move {
                dispatch(notifier.as_ref(), &notification, timeout).await;
            });
        }
    }
}
