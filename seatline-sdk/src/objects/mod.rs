pub mod admin;
pub mod error;
pub mod events;
pub mod registration;

pub use admin::{ClearCacheRequest, ClearCacheResponse};
pub use error::ErrorBody;
pub use events::EventResponse;
pub use registration::{CancelRequest, CancelResponse, RegisterRequest, RegistrationResponse};

use serde::{Deserialize, Serialize};

/// Gender of an attendee.
///
/// This is the API/DTO version without sqlx::Type.
/// For database operations, use the version in `seatline-core::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
    PreferNotToSay,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Female => write!(f, "female"),
            Gender::Male => write!(f, "male"),
            Gender::NonBinary => write!(f, "non-binary"),
            Gender::PreferNotToSay => write!(f, "prefer-not-to-say"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" => Ok(Gender::Female),
            "male" => Ok(Gender::Male),
            "non-binary" => Ok(Gender::NonBinary),
            "prefer-not-to-say" => Ok(Gender::PreferNotToSay),
            _ => Err(UnknownVariant(s.to_owned())),
        }
    }
}

/// Which venue city the attendee prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationPreference {
    Lagos,
    Ibadan,
}

impl std::fmt::Display for LocationPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationPreference::Lagos => write!(f, "lagos"),
            LocationPreference::Ibadan => write!(f, "ibadan"),
        }
    }
}

impl std::str::FromStr for LocationPreference {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lagos" => Ok(LocationPreference::Lagos),
            "ibadan" => Ok(LocationPreference::Ibadan),
            _ => Err(UnknownVariant(s.to_owned())),
        }
    }
}

/// Registration status for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStatus::Confirmed => write!(f, "confirmed"),
            RegistrationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Returned when a string does not name any variant of an enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);
