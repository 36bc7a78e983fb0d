use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use seatline_sdk::objects::EventResponse;
use time::OffsetDateTime;

/// An event attendees can register for.
///
/// Ids are assigned externally (seed catalogue). A `capacity` of zero or
/// less means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: String,
    pub starts_at: OffsetDateTime,
    pub ends_at: OffsetDateTime,
    pub location: String,
    pub capacity: i32,
    pub active: bool,
}

impl Event {
    pub fn is_unlimited(&self) -> bool {
        self.capacity <= 0
    }
}

/// An event joined with the number of non-cancelled registrations.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EventWithCount {
    #[sqlx(flatten)]
    pub event: Event,
    pub registration_count: i64,
}

impl EventWithCount {
    /// Remaining places, or `None` for unlimited events.
    pub fn spots_left(&self) -> Option<i64> {
        if self.event.is_unlimited() {
            None
        } else {
            Some((i64::from(self.event.capacity) - self.registration_count).max(0))
        }
    }

    pub fn is_full(&self) -> bool {
        !self.event.is_unlimited() && self.registration_count >= i64::from(self.event.capacity)
    }

    pub fn to_response(&self) -> EventResponse {
        EventResponse {
            id: self.event.id.clone(),
            name: self.event.name.clone(),
            description: self.event.description.clone(),
            starts_at: self.event.starts_at.unix_timestamp(),
            ends_at: self.event.ends_at.unix_timestamp(),
            location: self.event.location.clone(),
            capacity: self.event.capacity,
            registration_count: self.registration_count,
            spots_left: self.spots_left(),
        }
    }
}

const EVENT_WITH_COUNT_SELECT: &str = r#"
    SELECT
        e.id,
        e.name,
        e.description,
        e.starts_at,
        e.ends_at,
        e.location,
        e.capacity,
        e.active,
        COUNT(r.id) FILTER (WHERE r.status <> 'cancelled') AS registration_count
    FROM events e
    LEFT JOIN registrations r ON r.event_id = e.id
"#;

#[derive(Debug, Clone)]
/// List active events with their registration counts, soonest first.
pub struct ListEventsWithCounts;

impl Processor<ListEventsWithCounts> for DatabaseProcessor {
    type Output = Vec<EventWithCount>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListEventsWithCounts")]
    async fn process(&self, _: ListEventsWithCounts) -> Result<Vec<EventWithCount>, sqlx::Error> {
        let query = format!(
            "{EVENT_WITH_COUNT_SELECT} WHERE e.active = true GROUP BY e.id ORDER BY e.starts_at ASC"
        );
        let events = sqlx::query_as::<_, EventWithCount>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }
}

#[derive(Debug, Clone)]
/// Fetch a single event (active or not) together with its registration count.
///
/// Capacity and count come from the same statement so they are consistent
/// with each other.
pub struct GetEventWithCount {
    pub event_id: String,
}

impl Processor<GetEventWithCount> for DatabaseProcessor {
    type Output = Option<EventWithCount>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetEventWithCount")]
    async fn process(
        &self,
        query: GetEventWithCount,
    ) -> Result<Option<EventWithCount>, sqlx::Error> {
        let sql = format!("{EVENT_WITH_COUNT_SELECT} WHERE e.id = $1 GROUP BY e.id");
        let event = sqlx::query_as::<_, EventWithCount>(&sql)
            .bind(query.event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }
}

#[derive(Debug, Clone)]
/// Insert an event or overwrite every column of an existing one.
pub struct UpsertEvent {
    pub event: Event,
}

impl Processor<UpsertEvent> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpsertEvent")]
    async fn process(&self, cmd: UpsertEvent) -> Result<(), sqlx::Error> {
        let UpsertEvent { event } = cmd;
        sqlx::query(
            r#"
            INSERT INTO events (id, name, description, starts_at, ends_at, location, capacity, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                starts_at = EXCLUDED.starts_at,
                ends_at = EXCLUDED.ends_at,
                location = EXCLUDED.location,
                capacity = EXCLUDED.capacity,
                active = EXCLUDED.active
            "#,
        )
        .bind(event.id)
        .bind(event.name)
        .bind(event.description)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.location)
        .bind(event.capacity)
        .bind(event.active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Cheap round-trip used by the health endpoint.
pub struct PingDatabase;

impl Processor<PingDatabase> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    async fn process(&self, _: PingDatabase) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
