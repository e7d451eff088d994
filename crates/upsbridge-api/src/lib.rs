//! UPS Bridge HTTP API.
//!
//! Serves the telemetry of one Network-MS card as JSON:
//!
//! | Route | Auth | Description |
//! |-------|------|-------------|
//! | `GET /`, `GET /api/telemetry` | API key | Snapshot, `?format=json\|raw` |
//! | `GET /api/catalog` | API key | Known fields |
//! | `GET /api/status` | API key | Uptime and cache counters |
//! | `GET /api/health`, `GET /api/health/live` | public | Probes |

pub mod auth;
pub mod cache;
pub mod config;
pub mod handlers;
pub mod models;
pub mod server;
pub mod shutdown;
pub mod startup;

pub use config::{ConfigError, ServerConfig};
pub use server::{create_router, run, ServerState};
