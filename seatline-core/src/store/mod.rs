//! Storage seam for events and registrations.
//!
//! The engines only talk to [`EventStore`]; the Postgres backend is used in
//! production and the memory backend in development and tests.

use crate::entities::event::{Event, EventWithCount};
use crate::entities::registration::{InsertOutcome, Registration, RegistrationInsert};
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Active events ordered by start time, each with its non-cancelled count.
    async fn list_events_with_counts(&self) -> StoreResult<Vec<EventWithCount>>;

    /// One event (active or not) with capacity and count read together.
    async fn get_event_with_count(&self, event_id: &str) -> StoreResult<Option<EventWithCount>>;

    async fn find_active_registration(
        &self,
        event_id: &str,
        email: &str,
    ) -> StoreResult<Option<Registration>>;

    /// Atomic capacity-guarded insert.
    async fn insert_registration(&self, insert: RegistrationInsert) -> StoreResult<InsertOutcome>;

    async fn find_registration_by_ticket(&self, ticket: &str)
    -> StoreResult<Option<Registration>>;

    /// Most recent confirmed registration of `email`, else the most recent one.
    async fn find_latest_registration_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<Registration>>;

    /// Returns the number of rows removed.
    async fn delete_registration(&self, registration_id: Uuid) -> StoreResult<u64>;

    async fn count_registrations_by_id(&self, registration_id: Uuid) -> StoreResult<i64>;

    async fn upsert_event(&self, event: Event) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}
