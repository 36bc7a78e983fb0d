pub mod event;
pub mod registration;

use seatline_sdk::objects::{
    Gender as SdkGender, LocationPreference as SdkLocationPreference,
    RegistrationStatus as SdkRegistrationStatus,
};

/// Attendee gender for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `seatline_sdk::objects::Gender`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "kebab-case", type_name = "gender")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
    PreferNotToSay,
}

impl From<Gender> for SdkGender {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Female => SdkGender::Female,
            Gender::Male => SdkGender::Male,
            Gender::NonBinary => SdkGender::NonBinary,
            Gender::PreferNotToSay => SdkGender::PreferNotToSay,
        }
    }
}

impl From<SdkGender> for Gender {
    fn from(value: SdkGender) -> Self {
        match value {
            SdkGender::Female => Gender::Female,
            SdkGender::Male => Gender::Male,
            SdkGender::NonBinary => Gender::NonBinary,
            SdkGender::PreferNotToSay => Gender::PreferNotToSay,
        }
    }
}

/// Preferred venue city for database operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "location_preference")]
pub enum LocationPreference {
    Lagos,
    Ibadan,
}

impl From<LocationPreference> for SdkLocationPreference {
    fn from(value: LocationPreference) -> Self {
        match value {
            LocationPreference::Lagos => SdkLocationPreference::Lagos,
            LocationPreference::Ibadan => SdkLocationPreference::Ibadan,
        }
    }
}

impl From<SdkLocationPreference> for LocationPreference {
    fn from(value: SdkLocationPreference) -> Self {
        match value {
            SdkLocationPreference::Lagos => LocationPreference::Lagos,
            SdkLocationPreference::Ibadan => LocationPreference::Ibadan,
        }
    }
}

/// Registration status for database operations.
///
/// Cancellation deletes the row, so `Cancelled` only shows up on rows that
/// were marked by hand or imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "registration_status")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
}

impl From<RegistrationStatus> for SdkRegistrationStatus {
    fn from(value: RegistrationStatus) -> Self {
        match value {
            RegistrationStatus::Confirmed => SdkRegistrationStatus::Confirmed,
            RegistrationStatus::Cancelled => SdkRegistrationStatus::Cancelled,
        }
    }
}
