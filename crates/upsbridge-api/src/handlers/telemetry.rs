//! Telemetry and catalog handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use upsbridge_devices::{FieldCatalog, FieldKind, OutputMode, TelemetrySnapshot};

use super::ServerState;
use crate::models::{ApiResult, ErrorResponse};

/// Query parameters of the telemetry routes. `api_key` is consumed by the
/// auth middleware.
#[derive(Debug, Default, Deserialize)]
pub struct TelemetryQuery {
    pub format: Option<String>,
}

impl TelemetryQuery {
    /// Output mode selected by `format`, display when absent.
    pub fn mode(&self) -> ApiResult<OutputMode> {
        match self.format.as_deref() {
            None => Ok(OutputMode::Display),
            Some(format) => format.parse().map_err(ErrorResponse::bad_request),
        }
    }
}

/// Fetch, parse and return the current telemetry snapshot.
pub async fn telemetry_handler(
    State(state): State<ServerState>,
    Query(query): Query<TelemetryQuery>,
) -> ApiResult<Json<TelemetrySnapshot>> {
    let mode = query.mode()?;

    let payload = state.payload().await.map_err(|e| {
        warn!(upstream = %state.upstream.url(), "Failed to fetch UPS payload: {}", e);
        ErrorResponse::from(e)
    })?;

    let snapshot = state.parser.parse(&payload, mode).map_err(|e| {
        warn!(upstream = %state.upstream.url(), "Failed to parse UPS payload: {}", e);
        ErrorResponse::from(e)
    })?;

    Ok(Json(snapshot))
}

/// One field of the catalog as served by `/api/catalog`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub raw_key: &'static str,
    pub group: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub unit: Option<&'static str>,
    pub scale: f64,
}

/// The field catalog in declaration order.
pub async fn catalog_handler() -> Json<Vec<CatalogEntry>> {
    let entries = FieldCatalog::global()
        .iter()
        .map(|spec| CatalogEntry {
            raw_key: spec.raw_key,
            group: spec.group,
            label: spec.label,
            kind: spec.kind,
            unit: spec.unit,
            scale: spec.scale,
        })
        .collect();
    Json(entries)
}
