//! Basic handlers - health check and service status.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::json;

use super::ServerState;
use crate::cache::CacheStats;

/// Service status response.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatusResponse {
    pub status: String,
    pub service: String,
    pub version: &'static str,
    pub uptime: u64,
    pub upstream: String,
    pub auth_enabled: bool,
    pub cache: CacheStats,
}

/// Basic health check handler (public endpoint).
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "upsbridge",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness probe - simple check if server is running.
pub async fn liveness_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "alive",
    }))
}

/// Uptime, upstream target and cache counters.
pub async fn status_handler(State(state): State<ServerState>) -> Json<ServiceStatusResponse> {
    Json(ServiceStatusResponse {
        status: "healthy".to_string(),
        service: "upsbridge".to_string(),
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.uptime_secs(),
        upstream: state.upstream.url().to_string(),
        auth_enabled: state.auth.is_enabled(),
        cache: state.cache.stats(),
    })
}
