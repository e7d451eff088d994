//! UPS Network-MS Telemetry Crate
//!
//! Turns the script payload served by Eaton Network-MS cards into typed,
//! grouped telemetry. The parsing pipeline is pure: no I/O, no shared mutable
//! state, safe to call from any number of tasks.
//!
//! ## Features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `http` | ✅ | Upstream fetch client (reqwest) |
//!
//! ## Architecture
//!
//! - **Dialect extractors**: pull `key = value` assignments out of the payload
//! - **FieldCatalog**: static raw key to group/label/kind/unit table
//! - **Normalizer**: display string plus typed value per field kind
//! - **Assembler**: groups fields into a timestamped [`TelemetrySnapshot`]
//!
//! ```
//! use upsbridge_devices::{parse, OutputMode};
//!
//! let snapshot = parse(r#"ups_battery_runtime="2559";"#, OutputMode::Display).unwrap();
//! assert_eq!(
//!     snapshot.display_value("Battery", "Remaining backup time"),
//!     Some("42 mn 39 s")
//! );
//! ```

pub mod catalog;
pub mod dialect;
pub mod error;
pub mod normalizer;
pub mod parser;
pub mod snapshot;

#[cfg(feature = "http")]
pub mod upstream;

pub use catalog::{lookup, FieldCatalog, FieldKind, FieldSpec, Sentinel};
pub use dialect::{AssignmentExtractor, Dialect, RawAssignment, ScriptExtractor, TableExtractor};
pub use error::{FailureReason, ParseFailure, ParseResult};
pub use normalizer::{normalize, MetricValue, NormalizedValue, UNKNOWN_DISPLAY};
pub use parser::{parse, screen_payload, TelemetryParser};
pub use snapshot::{assemble, MeasurementGroup, OutputMode, TelemetrySnapshot};

#[cfg(feature = "http")]
pub use upstream::{FetchError, UpstreamClient, UpstreamConfig};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
