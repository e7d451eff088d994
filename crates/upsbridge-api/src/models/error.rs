//! Unified error handling for the API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use upsbridge_devices::{FailureReason, FetchError, ParseFailure};

/// API error response with its HTTP status.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status,
        }
    }

    /// Bad request (400).
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message, StatusCode::BAD_REQUEST)
    }

    /// Upstream unreachable (502).
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_UNAVAILABLE", message, StatusCode::BAD_GATEWAY)
    }

    /// Upstream answered with an error status (502).
    pub fn upstream_error(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_ERROR", message, StatusCode::BAD_GATEWAY)
    }

    /// Upstream did not answer in time (504).
    pub fn upstream_timeout(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_TIMEOUT", message, StatusCode::GATEWAY_TIMEOUT)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = serde_json::json!({
            "success": false,
            "error": {
                "code": self.code,
                "message": self.message,
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorResponse {}

impl From<ParseFailure> for ErrorResponse {
    fn from(e: ParseFailure) -> Self {
        let message = match e.reason {
            FailureReason::NoDataFound => format!("No telemetry found in UPS payload: {}", e.detail),
            FailureReason::MalformedPayload => format!("Unexpected UPS payload: {}", e.detail),
        };
        Self::new(e.reason.as_code(), message, StatusCode::BAD_GATEWAY)
    }
}

impl From<FetchError> for ErrorResponse {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Payload(failure) => failure.into(),
            FetchError::Timeout(_) => Self::upstream_timeout(e.to_string()),
            FetchError::Status(_) => Self::upstream_error(e.to_string()),
            FetchError::Request(_) => Self::upstream_unavailable(e.to_string()),
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ErrorResponse>;
