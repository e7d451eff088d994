//! Parsing pipeline: extract, normalize, assemble.

use tracing::debug;

use crate::catalog::FieldCatalog;
use crate::dialect::Dialect;
use crate::error::{ParseFailure, ParseResult};
use crate::snapshot::{assemble_with, OutputMode, TelemetrySnapshot};

/// Parser for synoptic payloads.
///
/// Stateless apart from the dialect choice; one instance can be shared by
/// every request task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryParser {
    dialect: Dialect,
}

impl TelemetryParser {
    /// Parser that detects the dialect per payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with a fixed dialect.
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parse a payload into a snapshot shaped for `mode`.
    ///
    /// Only fails with `NoDataFound`; payload screening for non-script
    /// documents is [`screen_payload`]'s job.
    pub fn parse(&self, text: &str, mode: OutputMode) -> ParseResult<TelemetrySnapshot> {
        let catalog = FieldCatalog::global();
        let extractor = self.dialect.extractor(text);
        let assignments = extractor.extract(text, catalog)?;
        let snapshot = assemble_with(catalog, &assignments, mode);

        debug!(
            dialect = extractor.name(),
            groups = snapshot.groups.len(),
            fields = snapshot.field_count(),
            "Parsed telemetry payload"
        );
        Ok(snapshot)
    }
}

/// Parse a payload with dialect detection.
pub fn parse(text: &str, mode: OutputMode) -> ParseResult<TelemetrySnapshot> {
    TelemetryParser::new().parse(text, mode)
}

/// Reject bodies that are recognizably not a synoptic payload.
///
/// Runs on fetched bodies before [`parse`]: an empty body, an HTML content
/// type or an HTML document (typically the card's login page) is a
/// `MalformedPayload`.
pub fn screen_payload(content_type: Option<&str>, body: &str) -> ParseResult<()> {
    if body.trim().is_empty() {
        return Err(ParseFailure::malformed_payload("empty body"));
    }

    if let Some(content_type) = content_type {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if mime == "text/html" || mime == "application/xhtml+xml" {
            return Err(ParseFailure::malformed_payload(format!(
                "unexpected content type '{}'",
                content_type
            )));
        }
    }

    let head: String = body
        .trim_start_matches('\u{feff}')
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    if head.starts_with("<!doctype html") || head.starts_with("<html") {
        return Err(ParseFailure::malformed_payload(
            "HTML document instead of a script payload",
        ));
    }

    Ok(())
}
