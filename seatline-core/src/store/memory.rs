//! In-memory implementation of [`EventStore`].
//!
//! Both tables sit behind one `tokio::sync::Mutex`, so the guarded insert
//! (existence, capacity and uniqueness checks plus the insert) is atomic
//! within the process. Nothing is durable; state is lost on restart.

use super::{EventStore, StoreError, StoreResult};
use crate::entities::RegistrationStatus;
use crate::entities::event::{Event, EventWithCount};
use crate::entities::registration::{InsertOutcome, Registration, RegistrationInsert};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Failure modes that can be switched on to exercise error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every operation fails with [`StoreError::Unavailable`].
    Unavailable,
    /// Deletes report success but leave the row in place.
    StaleDeletes,
}

#[derive(Debug, Default)]
struct State {
    events: HashMap<String, Event>,
    /// Insertion order doubles as creation order.
    registrations: Vec<Registration>,
    fault: Option<Fault>,
}

impl State {
    fn check_available(&self) -> StoreResult<()> {
        match self.fault {
            Some(Fault::Unavailable) => Err(StoreError::Unavailable(
                "memory store is switched off".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn active_count(&self, event_id: &str) -> i64 {
        self.registrations
            .iter()
            .filter(|r| r.event_id == event_id && r.status != RegistrationStatus::Cancelled)
            .count() as i64
    }

    fn with_count(&self, event: &Event) -> EventWithCount {
        EventWithCount {
            event: event.clone(),
            registration_count: self.active_count(&event.id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fault(&self, fault: Option<Fault>) {
        self.state.lock().await.fault = fault;
    }

    /// Flip a registration to `cancelled` without removing it.
    ///
    /// Cancellation through the engine deletes rows; this covers rows that
    /// were marked cancelled by other means.
    pub async fn mark_cancelled(&self, registration_id: Uuid) -> bool {
        let mut state = self.state.lock().await;
        match state
            .registrations
            .iter_mut()
            .find(|r| r.id == registration_id)
        {
            Some(registration) => {
                registration.status = RegistrationStatus::Cancelled;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_events_with_counts(&self) -> StoreResult<Vec<EventWithCount>> {
        let state = self.state.lock().await;
        state.check_available()?;
        let mut events: Vec<EventWithCount> = state
            .events
            .values()
            .filter(|e| e.active)
            .map(|e| state.with_count(e))
            .collect();
        events.sort_by(|a, b| {
            a.event
                .starts_at
                .cmp(&b.event.starts_at)
                .then_with(|| a.event.id.cmp(&b.event.id))
        });
        Ok(events)
    }

    async fn get_event_with_count(&self, event_id: &str) -> StoreResult<Option<EventWithCount>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state.events.get(event_id).map(|e| state.with_count(e)))
    }

    async fn find_active_registration(
        &self,
        event_id: &str,
        email: &str,
    ) -> StoreResult<Option<Registration>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state
            .registrations
            .iter()
            .find(|r| {
                r.event_id == event_id
                    && r.email == email
                    && r.status != RegistrationStatus::Cancelled
            })
            .cloned())
    }

    async fn insert_registration(&self, insert: RegistrationInsert) -> StoreResult<InsertOutcome> {
        let mut state = self.state.lock().await;
        state.check_available()?;

        let Some(event) = state.events.get(&insert.event_id).filter(|e| e.active) else {
            return Ok(InsertOutcome::EventNotFound);
        };
        if !event.is_unlimited() && state.active_count(&event.id) >= i64::from(event.capacity) {
            return Ok(InsertOutcome::AtCapacity);
        }
        if state
            .registrations
            .iter()
            .any(|r| r.ticket_number == insert.ticket_number)
        {
            return Ok(InsertOutcome::DuplicateTicket);
        }
        if state.registrations.iter().any(|r| {
            r.event_id == insert.event_id
                && r.email == insert.email
                && r.status != RegistrationStatus::Cancelled
        }) {
            return Ok(InsertOutcome::DuplicateEmail);
        }

        let registration = Registration {
            id: Uuid::now_v7(),
            event_id: insert.event_id,
            name: insert.name,
            gender: insert.gender,
            profession: insert.profession,
            phone_number: insert.phone_number,
            email: insert.email,
            location_preference: insert.location_preference,
            needs_directions: insert.needs_directions,
            notes: insert.notes,
            ticket_number: insert.ticket_number,
            status: RegistrationStatus::Confirmed,
            created_at: OffsetDateTime::now_utc(),
        };
        state.registrations.push(registration.clone());
        Ok(InsertOutcome::Inserted(registration))
    }

    async fn find_registration_by_ticket(
        &self,
        ticket: &str,
    ) -> StoreResult<Option<Registration>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state
            .registrations
            .iter()
            .find(|r| r.ticket_number == ticket)
            .cloned())
    }

    async fn find_latest_registration_by_email(
        &self,
        email: &str,
    ) -> StoreResult<Option<Registration>> {
        let state = self.state.lock().await;
        state.check_available()?;
        let mut matching = state.registrations.iter().rev().filter(|r| r.email == email);
        let confirmed = matching
            .clone()
            .find(|r| r.status == RegistrationStatus::Confirmed);
        Ok(confirmed.or_else(|| matching.next()).cloned())
    }

    async fn delete_registration(&self, registration_id: Uuid) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        state.check_available()?;
        let exists = state.registrations.iter().any(|r| r.id == registration_id);
        if !exists {
            return Ok(0);
        }
        if state.fault != Some(Fault::StaleDeletes) {
            state.registrations.retain(|r| r.id != registration_id);
        }
        Ok(1)
    }

    async fn count_registrations_by_id(&self, registration_id: Uuid) -> StoreResult<i64> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state
            .registrations
            .iter()
            .filter(|r| r.id == registration_id)
            .count() as i64)
    }

    async fn upsert_event(&self, event: Event) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.check_available()?;
        state.events.insert(event.id.clone(), event);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.state.lock().await.check_available()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Gender, LocationPreference};
    use time::macros::datetime;

    fn event(id: &str, capacity: i32) -> Event {
        Event {
            id: id.to_string(),
            name: format!("Event {id}"),
            description: String::new(),
            starts_at: datetime!(2026-11-01 18:00 UTC),
            ends_at: datetime!(2026-11-01 21:00 UTC),
            location: "Lagos".to_string(),
            capacity,
            active: true,
        }
    }

    fn insert(event_id: &str, email: &str, ticket: &str) -> RegistrationInsert {
        RegistrationInsert {
            event_id: event_id.to_string(),
            name: "Ada Obi".to_string(),
            gender: Gender::Female,
            profession: "Engineer".to_string(),
            phone_number: "08012345678".to_string(),
            email: email.to_string(),
            location_preference: LocationPreference::Lagos,
            needs_directions: false,
            notes: None,
            ticket_number: ticket.to_string(),
        }
    }

    fn inserted(outcome: InsertOutcome) -> Registration {
        match outcome {
            InsertOutcome::Inserted(r) => r,
            other => panic!("expected insert, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn guarded_insert_enforces_capacity_and_uniqueness() {
        let store = MemoryStore::new();
        store.upsert_event(event("meetup", 2)).await.unwrap();

        inserted(store.insert_registration(insert("meetup", "a@x.com", "T1")).await.unwrap());
        assert_eq!(
            store.insert_registration(insert("meetup", "a@x.com", "T2")).await.unwrap(),
            InsertOutcome::DuplicateEmail
        );
        assert_eq!(
            store.insert_registration(insert("meetup", "b@x.com", "T1")).await.unwrap(),
            InsertOutcome::DuplicateTicket
        );
        inserted(store.insert_registration(insert("meetup", "b@x.com", "T3")).await.unwrap());
        assert_eq!(
            store.insert_registration(insert("meetup", "c@x.com", "T4")).await.unwrap(),
            InsertOutcome::AtCapacity
        );
        assert_eq!(
            store.insert_registration(insert("missing", "c@x.com", "T5")).await.unwrap(),
            InsertOutcome::EventNotFound
        );
    }

    #[tokio::test]
    async fn concurrent_inserts_never_overbook() {
        let store = MemoryStore::new();
        store.upsert_event(event("tight", 3)).await.unwrap();

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_registration(insert(
                            "tight",
                            &format!("user{i}@x.com"),
                            &format!("T{i}"),
                        ))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), InsertOutcome::Inserted(_)) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 3);
        let view = store.get_event_with_count("tight").await.unwrap().unwrap();
        assert_eq!(view.registration_count, 3);
    }

    #[tokio::test]
    async fn cancelled_rows_do_not_count() {
        let store = MemoryStore::new();
        store.upsert_event(event("meetup", 1)).await.unwrap();
        let first =
            inserted(store.insert_registration(insert("meetup", "a@x.com", "T1")).await.unwrap());
        assert!(store.mark_cancelled(first.id).await);

        let view = store.get_event_with_count("meetup").await.unwrap().unwrap();
        assert_eq!(view.registration_count, 0);
        assert!(store.find_active_registration("meetup", "a@x.com").await.unwrap().is_none());
        inserted(store.insert_registration(insert("meetup", "a@x.com", "T2")).await.unwrap());
    }

    #[tokio::test]
    async fn latest_by_email_prefers_confirmed() {
        let store = MemoryStore::new();
        store.upsert_event(event("one", 0)).await.unwrap();
        store.upsert_event(event("two", 0)).await.unwrap();
        let older =
            inserted(store.insert_registration(insert("one", "a@x.com", "T1")).await.unwrap());
        let newer =
            inserted(store.insert_registration(insert("two", "a@x.com", "T2")).await.unwrap());

        let found = store.find_latest_registration_by_email("a@x.com").await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(newer.id));

        store.mark_cancelled(newer.id).await;
        let found = store.find_latest_registration_by_email("a@x.com").await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(older.id));

        store.mark_cancelled(older.id).await;
        let found = store.find_latest_registration_by_email("a@x.com").await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(newer.id));
    }

    #[tokio::test]
    async fn list_skips_inactive_events() {
        let store = MemoryStore::new();
        let mut hidden = event("hidden", 0);
        hidden.active = false;
        store.upsert_event(hidden).await.unwrap();
        store.upsert_event(event("shown", 0)).await.unwrap();

        let list = store.list_events_with_counts().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].event.id, "shown");
        assert!(store.get_event_with_count("hidden").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn faults_surface_as_errors() {
        let store = MemoryStore::new();
        store.upsert_event(event("meetup", 0)).await.unwrap();
        let reg =
            inserted(store.insert_registration(insert("meetup", "a@x.com", "T1")).await.unwrap());

        store.set_fault(Some(Fault::StaleDeletes)).await;
        assert_eq!(store.delete_registration(reg.id).await.unwrap(), 1);
        assert_eq!(store.count_registrations_by_id(reg.id).await.unwrap(), 1);

        store.set_fault(Some(Fault::Unavailable)).await;
        assert!(matches!(
            store.health_check().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.list_events_with_counts().await.is_err());

        store.set_fault(None).await;
        assert_eq!(store.delete_registration(reg.id).await.unwrap(), 1);
        assert_eq!(store.count_registrations_by_id(reg.id).await.unwrap(), 0);
        assert_eq!(store.backend_name(), "memory");
    }
}
