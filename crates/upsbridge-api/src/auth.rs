//! API key authentication middleware.
//!
//! A single shared key protects the telemetry routes. The key is kept only as
//! a SHA-256 digest and presented keys are compared digest to digest.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Hash an API key for storage and comparison.
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hasher.update(b"upsbridge-api-key-v1");
    format!("{:x}", hasher.finalize())
}

/// Access control state. Open access when no key is configured.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    key_hash: Option<String>,
}

impl AuthState {
    pub fn new(api_key: Option<&str>) -> Self {
        Self {
            key_hash: api_key.filter(|k| !k.is_empty()).map(hash_api_key),
        }
    }

    /// State that lets every request through.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.key_hash.is_some()
    }

    /// Validate a presented key.
    pub fn validate_key(&self, api_key: &str) -> bool {
        match &self.key_hash {
            Some(expected) => hash_api_key(api_key) == *expected,
            None => true,
        }
    }
}

/// Authentication error response.
#[derive(Debug)]
pub struct AuthError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
            "status": self.status.as_u16(),
        });
        (self.status, Json(body)).into_response()
    }
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// Token of an `Authorization: Bearer` value. The scheme is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Keys presented by the request, in precedence order: `X-API-Key`,
/// `Authorization: Bearer`, `?api_key=`.
fn presented_keys(headers: &HeaderMap, req: &axum::extract::Request) -> Vec<String> {
    let mut keys = Vec::with_capacity(3);
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        keys.push(key.to_string());
    }
    if let Some(key) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
    {
        keys.push(key.to_string());
    }
    if let Ok(Query(query)) = Query::<ApiKeyQuery>::try_from_uri(req.uri()) {
        if let Some(key) = query.api_key {
            keys.push(key);
        }
    }
    keys
}

/// API key authentication middleware.
///
/// Passes everything through when no key is configured. Otherwise any one
/// matching presented key is enough.
pub async fn api_key_middleware(
    State(auth): State<Arc<AuthState>>,
    headers: HeaderMap,
    req: axum::extract::Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !auth.is_enabled() {
        return Ok(next.run(req).await);
    }

    let keys = presented_keys(&headers, &req);
    if keys.is_empty() {
        debug!(path = %req.uri().path(), "Rejected request without API key");
        return Err(AuthError::unauthorized(
            "Missing API key. Provide Authorization: Bearer <key>, X-API-Key or ?api_key=<key>",
        ));
    }

    if !keys.iter().any(|k| auth.validate_key(k)) {
        debug!(path = %req.uri().path(), "Rejected request with invalid API key");
        return Err(AuthError::unauthorized("Invalid or missing API key"));
    }

    Ok(next.run(req).await)
}
