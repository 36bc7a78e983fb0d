//! Event system for post-commit side effects.
//!
//! The engines publish a `NotificationEvent` after a registration or
//! cancellation has been committed and the cache invalidated. The
//! `NotificationSender` processor consumes them off the request path.
//!
//! Events are ephemeral: a full or closed channel drops the event with a
//! warning and never fails the request that produced it.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, NotificationEventReceiver, NotificationEventSender,
    NotificationPublisher, notification_event_channel,
};

pub use types::NotificationEvent;
