use crate::entities::{Gender, LocationPreference, RegistrationStatus};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use seatline_sdk::objects::RegistrationResponse;
use time::OffsetDateTime;
use uuid::Uuid;

/// Unique constraint on `registrations.ticket_number`.
pub const TICKET_UNIQUE_CONSTRAINT: &str = "registrations_ticket_number_key";
/// Partial unique index on `(event_id, email)` for non-cancelled rows.
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "registrations_event_email_active_idx";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: String,
    pub name: String,
    pub gender: Gender,
    pub profession: String,
    pub phone_number: String,
    pub email: String,
    pub location_preference: LocationPreference,
    pub needs_directions: bool,
    pub notes: Option<String>,
    pub ticket_number: String,
    pub status: RegistrationStatus,
    pub created_at: OffsetDateTime,
}

impl Registration {
    pub fn to_response(&self) -> RegistrationResponse {
        RegistrationResponse {
            id: self.id,
            event_id: self.event_id.clone(),
            name: self.name.clone(),
            gender: self.gender.into(),
            profession: self.profession.clone(),
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
            location_preference: self.location_preference.into(),
            needs_directions: self.needs_directions,
            notes: self.notes.clone(),
            ticket_number: self.ticket_number.clone(),
            status: self.status.into(),
            created_at: self.created_at.unix_timestamp(),
        }
    }
}

/// Data for inserting a new registration.
///
/// Fields are expected to be validated and normalized already.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationInsert {
    pub event_id: String,
    pub name: String,
    pub gender: Gender,
    pub profession: String,
    pub phone_number: String,
    pub email: String,
    pub location_preference: LocationPreference,
    pub needs_directions: bool,
    pub notes: Option<String>,
    pub ticket_number: String,
}

/// Result of a capacity-guarded insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Registration),
    /// The event does not exist or is not active.
    EventNotFound,
    /// The event already holds `capacity` non-cancelled registrations.
    AtCapacity,
    /// A non-cancelled registration for the same (event, email) exists.
    DuplicateEmail,
    /// The generated ticket number is already taken.
    DuplicateTicket,
}

const REGISTRATION_COLUMNS: &str = r#"
    id,
    event_id,
    name,
    gender,
    profession,
    phone_number,
    email,
    location_preference,
    needs_directions,
    notes,
    ticket_number,
    status,
    created_at
"#;

#[derive(Debug, Clone)]
/// Find the non-cancelled registration of `email` for an event, if any.
pub struct FindActiveRegistration {
    pub event_id: String,
    pub email: String,
}

impl Processor<FindActiveRegistration> for DatabaseProcessor {
    type Output = Option<Registration>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:FindActiveRegistration")]
    async fn process(
        &self,
        query: FindActiveRegistration,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations \
             WHERE event_id = $1 AND email = $2 AND status <> 'cancelled' \
             LIMIT 1"
        );
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(query.event_id)
            .bind(query.email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(registration)
    }
}

#[derive(Debug, Clone)]
/// Insert a registration unless the event is missing, inactive or full.
///
/// Runs in one transaction that locks the event row first, so concurrent
/// inserts for the same event are serialized and the capacity check cannot
/// be raced.
pub struct InsertRegistrationGuarded {
    pub insert: RegistrationInsert,
}

impl Processor<InsertRegistrationGuarded> for DatabaseProcessor {
    type Output = InsertOutcome;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertRegistrationGuarded")]
    async fn process(&self, cmd: InsertRegistrationGuarded) -> Result<InsertOutcome, sqlx::Error> {
        let insert = cmd.insert;
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, (i32, bool)>(
            "SELECT capacity, active FROM events WHERE id = $1 FOR UPDATE",
        )
        .bind(&insert.event_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((capacity, active)) = event else {
            return Ok(InsertOutcome::EventNotFound);
        };
        if !active {
            return Ok(InsertOutcome::EventNotFound);
        }

        if capacity > 0 {
            let count = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status <> 'cancelled'",
            )
            .bind(&insert.event_id)
            .fetch_one(&mut *tx)
            .await?;
            if count >= i64::from(capacity) {
                return Ok(InsertOutcome::AtCapacity);
            }
        }

        let sql = format!(
            "INSERT INTO registrations \
             (id, event_id, name, gender, profession, phone_number, email, \
              location_preference, needs_directions, notes, ticket_number, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'confirmed') \
             RETURNING {REGISTRATION_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Registration>(&sql)
            .bind(Uuid::now_v7())
            .bind(insert.event_id)
            .bind(insert.name)
            .bind(insert.gender)
            .bind(insert.profession)
            .bind(insert.phone_number)
            .bind(insert.email)
            .bind(insert.location_preference)
            .bind(insert.needs_directions)
            .bind(insert.notes)
            .bind(insert.ticket_number)
            .fetch_one(&mut *tx)
            .await;

        match inserted {
            Ok(registration) => {
                tx.commit().await?;
                Ok(InsertOutcome::Inserted(registration))
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => match db.constraint() {
                Some(TICKET_UNIQUE_CONSTRAINT) => Ok(InsertOutcome::DuplicateTicket),
                Some(EMAIL_UNIQUE_CONSTRAINT) => Ok(InsertOutcome::DuplicateEmail),
                _ => Err(sqlx::Error::Database(db)),
            },
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone)]
/// Look a registration up by its (normalized) ticket number.
pub struct GetRegistrationByTicket {
    pub ticket_number: String,
}

impl Processor<GetRegistrationByTicket> for DatabaseProcessor {
    type Output = Option<Registration>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetRegistrationByTicket")]
    async fn process(
        &self,
        query: GetRegistrationByTicket,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE ticket_number = $1");
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(query.ticket_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(registration)
    }
}

#[derive(Debug, Clone)]
/// The most recent confirmed registration of `email`, falling back to the
/// most recent one of any status.
pub struct GetLatestRegistrationByEmail {
    pub email: String,
}

impl Processor<GetLatestRegistrationByEmail> for DatabaseProcessor {
    type Output = Option<Registration>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetLatestRegistrationByEmail")]
    async fn process(
        &self,
        query: GetLatestRegistrationByEmail,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE email = $1 \
             ORDER BY (status = 'confirmed') DESC, created_at DESC, id DESC \
             LIMIT 1"
        );
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(query.email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(registration)
    }
}

#[derive(Debug, Clone)]
/// Delete a registration row. Returns the number of rows removed.
pub struct DeleteRegistration {
    pub registration_id: Uuid,
}

impl Processor<DeleteRegistration> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteRegistration")]
    async fn process(&self, cmd: DeleteRegistration) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(cmd.registration_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
/// Count rows with the given id. Used to verify a delete took effect.
pub struct CountRegistrationsById {
    pub registration_id: Uuid,
}

impl Processor<CountRegistrationsById> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CountRegistrationsById")]
    async fn process(&self, query: CountRegistrationsById) -> Result<i64, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM registrations WHERE id = $1")
            .bind(query.registration_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
