//! Registration and cancellation business rules.
//!
//! The store is the source of truth; the engines invalidate the cached
//! event views after every committed change and only then publish the
//! notification event.

pub mod cancel;
pub mod catalog;
pub mod error;
pub mod register;
pub mod validate;

pub use cancel::{CancelTarget, CancellationEngine};
pub use catalog::{ClearCacheScope, EventCatalog};
pub use error::{RegistrationError, ValidationError};
pub use register::RegistrationEngine;
pub use validate::RegistrationFields;
