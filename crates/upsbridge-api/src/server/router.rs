//! Application router configuration.

use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::state::ServerState;
use crate::auth::api_key_middleware;
use crate::handlers::{basic, telemetry};

/// Maximum request body size. Every route is a GET.
pub const MAX_REQUEST_BODY_SIZE: usize = 16 * 1024;

/// Create the application router with a specific state.
pub fn create_router(state: ServerState) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(basic::health_handler))
        .route("/api/health/live", get(basic::liveness_handler));

    let protected_routes = Router::new()
        .route("/", get(telemetry::telemetry_handler))
        .route("/api/telemetry", get(telemetry::telemetry_handler))
        .route("/api/catalog", get(telemetry::catalog_handler))
        .route("/api/status", get(basic::status_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.auth.clone(),
            api_key_middleware,
        ));

    public_routes
        .merge(protected_routes)
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
