//! Request handlers.

pub mod basic;
pub mod telemetry;

pub use crate::server::ServerState;
