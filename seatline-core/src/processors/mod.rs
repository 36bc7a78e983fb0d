//! Background processors.
//!
//! - `NotificationSender`: receives `NotificationEvent`, delivers notifications
//! - `Janitor`: sweeps expired cache entries and rate-limit counters
//!
//! Both stop when the shared shutdown watch flips to `true`.

pub mod janitor;
pub mod notification_sender;

pub use janitor::Janitor;
pub use notification_sender::NotificationSender;
