use super::catalog::EventCatalog;
use super::error::RegistrationError;
use super::validate::{RegistrationFields, validate};
use crate::entities::registration::{InsertOutcome, Registration};
use crate::events::{NotificationEvent, NotificationPublisher};
use crate::store::EventStore;
use seatline_sdk::ticket::TicketCode;
use std::sync::Arc;
use std::time::Instant;

type TicketGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Creates registrations under the capacity and uniqueness rules.
#[derive(Clone)]
pub struct RegistrationEngine {
    store: Arc<dyn EventStore>,
    catalog: EventCatalog,
    publisher: Option<NotificationPublisher>,
    tickets: TicketGenerator,
}

impl RegistrationEngine {
    pub fn new(
        store: Arc<dyn EventStore>,
        catalog: EventCatalog,
        publisher: Option<NotificationPublisher>,
    ) -> Self {
        Self {
            store,
            catalog,
            publisher,
            tickets: Arc::new(|| TicketCode::generate().into_string()),
        }
    }

    /// Replace the ticket source.
    pub fn with_ticket_generator(
        mut self,
        generator: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.tickets = Arc::new(generator);
        self
    }

    /// Register for `event_id`.
    ///
    /// Checks run in order and stop at the first failure: field validation,
    /// duplicate (event, email), event exists and is active, capacity. The
    /// insert re-checks existence and capacity atomically in the store, so
    /// the earlier capacity check only produces the common-case error early.
    pub async fn register(
        &self,
        event_id: &str,
        fields: RegistrationFields,
    ) -> Result<Registration, RegistrationError> {
        let started = Instant::now();
        let valid = validate(event_id, &fields)?;

        if self
            .store
            .find_active_registration(&valid.event_id, &valid.email)
            .await?
            .is_some()
        {
            return Err(RegistrationError::DuplicateRegistration);
        }

        let event = match self.store.get_event_with_count(&valid.event_id).await? {
            Some(event) if event.event.active => event,
            _ => return Err(RegistrationError::EventNotFound),
        };
        if event.is_full() {
            return Err(RegistrationError::EventAtCapacity);
        }

        let mut outcome = self
            .store
            .insert_registration(valid.to_insert((self.tickets)()))
            .await?;
        if outcome == InsertOutcome::DuplicateTicket {
            tracing::warn!(event_id = %valid.event_id, "Ticket number collision, regenerating");
            outcome = self
                .store
                .insert_registration(valid.to_insert((self.tickets)()))
                .await?;
        }

        let registration = match outcome {
            InsertOutcome::Inserted(registration) => registration,
            InsertOutcome::EventNotFound => return Err(RegistrationError::EventNotFound),
            InsertOutcome::AtCapacity => return Err(RegistrationError::EventAtCapacity),
            InsertOutcome::DuplicateEmail => return Err(RegistrationError::DuplicateRegistration),
            InsertOutcome::DuplicateTicket => {
                tracing::error!(
                    event_id = %valid.event_id,
                    "Ticket number collided twice, giving up"
                );
                return Err(RegistrationError::DuplicateRegistration);
            }
        };

        self.catalog.invalidate_event(&registration.event_id);

        tracing::info!(
            registration_id = %registration.id,
            event_id = %registration.event_id,
            ticket_number = %registration.ticket_number,
            duration_ms = started.elapsed().as_millis() as u64,
            "Registration confirmed"
        );

        if let Some(publisher) = &self.publisher {
            publisher.publish(NotificationEvent::Registered {
                registration: registration.clone(),
                event_name: event.event.name,
            });
        }

        Ok(registration)
    }
}
