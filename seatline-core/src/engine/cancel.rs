use super::catalog::EventCatalog;
use super::error::{RegistrationError, ValidationError};
use super::validate::normalize_email;
use crate::entities::RegistrationStatus;
use crate::entities::registration::Registration;
use crate::events::{NotificationEvent, NotificationPublisher};
use crate::store::EventStore;
use seatline_sdk::ticket;
use std::sync::Arc;
use std::time::Instant;

/// How the registration to cancel is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelTarget {
    /// Normalized (upper-case) ticket number.
    Ticket(String),
    /// Normalized (lower-case) email; the latest confirmed registration wins.
    Email(String),
}

impl CancelTarget {
    /// Build a target from optional request fields. The ticket wins when
    /// both are given; blank values count as absent.
    pub fn from_parts(
        ticket_number: Option<&str>,
        email: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let ticket_number = ticket_number.map(ticket::normalize).filter(|t| !t.is_empty());
        let email = email.map(normalize_email).filter(|e| !e.is_empty());
        match (ticket_number, email) {
            (Some(ticket_number), _) => Ok(CancelTarget::Ticket(ticket_number)),
            (None, Some(email)) => Ok(CancelTarget::Email(email)),
            (None, None) => Err(ValidationError::new(
                "ticket_number",
                "either ticket_number or email is required",
            )),
        }
    }
}

/// Cancels registrations by deleting them.
#[derive(Clone)]
pub struct CancellationEngine {
    store: Arc<dyn EventStore>,
    catalog: EventCatalog,
    publisher: Option<NotificationPublisher>,
}

impl CancellationEngine {
    pub fn new(
        store: Arc<dyn EventStore>,
        catalog: EventCatalog,
        publisher: Option<NotificationPublisher>,
    ) -> Self {
        Self {
            store,
            catalog,
            publisher,
        }
    }

    pub async fn cancel(&self, target: CancelTarget) -> Result<Registration, RegistrationError> {
        let started = Instant::now();
        let found = match &target {
            CancelTarget::Ticket(ticket) => self.store.find_registration_by_ticket(ticket).await?,
            CancelTarget::Email(email) => {
                self.store.find_latest_registration_by_email(email).await?
            }
        };
        let Some(registration) = found else {
            return Err(RegistrationError::RegistrationNotFound);
        };
        if registration.status == RegistrationStatus::Cancelled {
            return Err(RegistrationError::AlreadyCancelled);
        }

        let deleted = self
            .store
            .delete_registration(registration.id)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    registration_id = %registration.id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Failed to delete registration"
                )
            })?;
        if deleted == 0 {
            // Removed by a concurrent cancellation between lookup and delete.
            return Err(RegistrationError::RegistrationNotFound);
        }

        let remaining = self
            .store
            .count_registrations_by_id(registration.id)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    registration_id = %registration.id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Failed to verify registration delete"
                )
            })?;
        if remaining > 0 {
            tracing::error!(
                registration_id = %registration.id,
                remaining,
                duration_ms = started.elapsed().as_millis() as u64,
                "Registration still visible after delete"
            );
            return Err(RegistrationError::CancellationInconsistent {
                registration_id: registration.id,
            });
        }

        self.catalog.invalidate_event(&registration.event_id);

        tracing::info!(
            registration_id = %registration.id,
            event_id = %registration.event_id,
            duration_ms = started.elapsed().as_millis() as u64,
            "Registration cancelled"
        );

        if let Some(publisher) = &self.publisher {
            publisher.publish(NotificationEvent::Cancelled {
                registration: registration.clone(),
            });
        }

        Ok(registration)
    }
}
