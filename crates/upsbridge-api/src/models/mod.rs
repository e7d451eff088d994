//! API data models.

pub mod error;

pub use error::{ApiResult, ErrorResponse};
