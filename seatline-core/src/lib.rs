#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod cache;
pub mod config;
pub mod engine;
pub mod entities;
pub mod events;
pub mod framework;
pub mod notify;
pub mod processors;
pub mod rate_limit;
pub mod store;
