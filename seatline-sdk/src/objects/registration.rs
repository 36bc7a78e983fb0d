//! Registration and cancellation request/response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Gender, LocationPreference, RegistrationStatus};

/// Request body for `POST /events/register`.
///
/// Enum fields are carried as strings so that an unknown value surfaces as a
/// field validation error instead of a JSON rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub event_id: String,
    pub name: String,
    pub gender: String,
    pub profession: String,
    pub phone_number: String,
    pub email: String,
    pub location_preference: String,
    #[serde(default)]
    pub needs_directions: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A confirmed registration as returned to the attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
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
    pub created_at: i64,
}

/// Request body for `POST /events/cancel`.
///
/// Exactly one of the two fields is expected. When both are present the
/// ticket number is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub ticket_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CancelRequest {
    pub fn by_ticket(ticket_number: impl Into<String>) -> Self {
        Self {
            ticket_number: Some(ticket_number.into()),
            email: None,
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            ticket_number: None,
            email: Some(email.into()),
        }
    }
}

/// Response body for a successful cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResponse {
    pub message: String,
    pub ticket_number: String,
    pub event_id: String,
}
