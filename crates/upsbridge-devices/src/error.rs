//! Parse failure taxonomy.
//!
//! Only two kinds of failure ever leave the parsing pipeline. Per-field
//! normalization problems are absorbed by the normalizer and never surface here.

use serde::{Deserialize, Serialize};

/// Why a payload could not be turned into a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Nothing matching the assignment idiom was found in the payload.
    NoDataFound,
    /// The payload is recognizably not the expected document.
    MalformedPayload,
}

impl FailureReason {
    /// Machine-readable code, used by the HTTP layer.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::NoDataFound => "NO_DATA_FOUND",
            Self::MalformedPayload => "MALFORMED_PAYLOAD",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDataFound => write!(f, "no data found"),
            Self::MalformedPayload => write!(f, "malformed payload"),
        }
    }
}

/// Typed parse failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{reason}: {detail}")]
pub struct ParseFailure {
    pub reason: FailureReason,
    pub detail: String,
}

impl ParseFailure {
    pub fn no_data_found(detail: impl Into<String>) -> Self {
        Self {
            reason: FailureReason::NoDataFound,
            detail: detail.into(),
        }
    }

    pub fn malformed_payload(detail: impl Into<String>) -> Self {
        Self {
            reason: FailureReason::MalformedPayload,
            detail: detail.into(),
        }
    }
}

/// Result alias for the parsing pipeline.
pub type ParseResult<T> = Result<T, ParseFailure>;
