//! Shared types for the seatline event registration service.
//!
//! - [`objects`]: request and response bodies of the HTTP API.
//! - [`ticket`]: generation and verification of ticket codes.
//! - `client`: a typed HTTP client (behind the `client` feature).

#![deny(clippy::unwrap_used)]
#![forbid(unsafe_code)]

pub mod objects;
pub mod ticket;

#[cfg(feature = "client")]
pub mod client;
