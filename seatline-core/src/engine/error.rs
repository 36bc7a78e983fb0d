use crate::rate_limit::RateLimitReason;
use crate::store::StoreError;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Failures of the registration and cancellation paths.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("this email is already registered for the event")]
    DuplicateRegistration,

    #[error("event not found")]
    EventNotFound,

    #[error("event is at capacity")]
    EventAtCapacity,

    #[error("registration is already cancelled")]
    AlreadyCancelled,

    #[error("registration not found")]
    RegistrationNotFound,

    /// The row was deleted but is still visible on re-read.
    #[error("registration {registration_id} still present after delete")]
    CancellationInconsistent { registration_id: Uuid },

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("{reason}")]
    RateLimited {
        reason: RateLimitReason,
        retry_after: Duration,
    },
}

impl RegistrationError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            RegistrationError::InvalidInput(_) => "InvalidInput",
            RegistrationError::DuplicateRegistration => "DuplicateRegistration",
            RegistrationError::EventNotFound => "EventNotFound",
            RegistrationError::EventAtCapacity => "EventAtCapacity",
            RegistrationError::AlreadyCancelled => "AlreadyCancelled",
            RegistrationError::RegistrationNotFound => "RegistrationNotFound",
            RegistrationError::CancellationInconsistent { .. } => "CancellationInconsistent",
            RegistrationError::StoreUnavailable(_) => "StoreUnavailable",
            RegistrationError::RateLimited { .. } => "RateLimited",
        }
    }

    /// Whether the caller can fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            RegistrationError::CancellationInconsistent { .. }
                | RegistrationError::StoreUnavailable(_)
        )
    }
}
