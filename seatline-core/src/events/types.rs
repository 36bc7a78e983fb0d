//! Event type definitions.

use crate::entities::registration::Registration;

/// Emitted once a registration change has been committed.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    Registered {
        registration: Registration,
        event_name: String,
    },
    Cancelled {
        registration: Registration,
    },
}

impl NotificationEvent {
    pub fn registration(&self) -> &Registration {
        match self {
            NotificationEvent::Registered { registration, .. } => registration,
            NotificationEvent::Cancelled { registration } => registration,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::Registered { .. } => "registered",
            NotificationEvent::Cancelled { .. } => "cancelled",
        }
    }
}
