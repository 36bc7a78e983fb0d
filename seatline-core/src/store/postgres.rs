use super::{EventStore, StoreResult};
use crate::entities::event::{
    Event, EventWithCount, GetEventWithCount, ListEventsWithCounts, PingDatabase, UpsertEvent,
};
use crate::entities::registration::{
    CountRegistrationsById, DeleteRegistration, FindActiveRegistration,
    GetLatestRegistrationByEmail, GetRegistrationByTicket, InsertOutcome,
    InsertRegistrationGuarded, Registration, RegistrationInsert,
};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;
use uuid::Uuid;

/// [`EventStore`] backed by Postgres through the SQL processors.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    db: DatabaseProcessor,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            db: DatabaseProcessor::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db.pool
    }
}

#[async_trait]
impl EventStore for PostgresStore {
    async fn list_events_with_counts(&self) -> StoreResult<Vec<EventWithCount>> {
        Ok(self.db.process(ListEventsWithCounts).await?)
    }

    async fn get_event_with_count(&self, event_id: &str) -> StoreResult<Option<EventWithCount>> {
        Ok(self
            .db
            .process(GetEventWithCount {
                event_id: event_id.to_string(),
            })
            .await?)
    }

    async fn find_active_registration(
        &self,
        event_id: &str,
        email: &str,
    ) -> StoreResult<Option<Registration>> {
        Ok(self
            .db
            .process(FindActiveRegistration {
                event_id: event_id.to_string(),
                email: email.to_string(),
            })
            .await?)
    }

    async fn insert_registration(&self, insert: RegistrationInsert) -> StoreResult<InsertOutcome> {
        Ok(self.db.process(InsertRegistrationGuarded { insert }).await?)
    }

    async fn find_registration_by_ticket(
        &self,
        ticket: &str,
    ) -> StoreResult<Option<Registration>> {
        Ok(self
            .db
            .process(GetRegistrationByTicket {
                ticket_number: ticket.to_string(),
            })
            .await?)
    }

    async fn find_latest_registration_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<Registration>> {
        Ok(self
            .db
            .process(GetLatestRegistrationByEmail {
                email: email.to_string(),
            })
            .await?)
    }

    async fn delete_registration(&self, registration_id: Uuid) -> StoreResult<u64> {
        Ok(self
            .db
            .process(DeleteRegistration { registration_id })
            .await?)
    }

    async fn count_registrations_by_id(&self, registration_id: Uuid) -> StoreResult<i64> {
        Ok(self
            .db
            .process(CountRegistrationsById { registration_id })
            .await?)
    }

    async fn upsert_event(&self, event: Event) -> StoreResult<()> {
        Ok(self.db.process(UpsertEvent { event }).await?)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(self.db.process(PingDatabase).await?)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
