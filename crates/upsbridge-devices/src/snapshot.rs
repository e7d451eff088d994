//! Snapshot assembly.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::trace;

use crate::catalog::FieldCatalog;
use crate::dialect::RawAssignment;
use crate::normalizer::{normalize, MetricValue, NormalizedValue};

/// Output shape of a snapshot's leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Human-readable strings with units. Selected by `format=json`.
    #[default]
    Display,
    /// Bare numbers, strings or `null`. Selected by `format=raw`.
    Raw,
}

impl OutputMode {
    /// The `format` query value that selects this mode.
    pub fn as_format(&self) -> &'static str {
        match self {
            Self::Display => "json",
            Self::Raw => "raw",
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_format())
    }
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "display" => Ok(Self::Display),
            "raw" => Ok(Self::Raw),
            other => Err(format!("unsupported format '{}', expected json|raw", other)),
        }
    }
}

/// Fields of one display group, keyed by label.
pub type MeasurementGroup = BTreeMap<String, NormalizedValue>;

/// Parsed telemetry, grouped by display group.
///
/// Serializes to a single JSON object: `timestamp` next to one object per
/// group, whose leaves are display strings or raw values depending on
/// [`TelemetrySnapshot::mode`].
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySnapshot {
    pub timestamp: DateTime<Utc>,
    pub mode: OutputMode,
    pub groups: BTreeMap<String, MeasurementGroup>,
}

impl TelemetrySnapshot {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of fields across all groups.
    pub fn field_count(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }

    pub fn get(&self, group: &str, label: &str) -> Option<&NormalizedValue> {
        self.groups.get(group)?.get(label)
    }

    /// Display string of a field, if present.
    pub fn display_value(&self, group: &str, label: &str) -> Option<&str> {
        self.get(group, label).map(|v| v.display_string.as_str())
    }

    /// Raw value of a field, if present.
    pub fn raw_value(&self, group: &str, label: &str) -> Option<&MetricValue> {
        self.get(group, label).map(|v| &v.raw_value)
    }

    /// Same snapshot, shaped for another output mode.
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// ISO-8601 timestamp with microseconds and an explicit `+00:00` offset.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, false)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for TelemetrySnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len() + 1))?;
        map.serialize_entry("timestamp", &self.timestamp_string())?;
        for (group, fields) in &self.groups {
            map.serialize_entry(group, &GroupView { fields, mode: self.mode })?;
        }
        map.end()
    }
}

struct GroupView<'a> {
    fields: &'a MeasurementGroup,
    mode: OutputMode,
}

impl Serialize for GroupView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (label, value) in self.fields {
            match self.mode {
                OutputMode::Display => map.serialize_entry(label, &value.display_string)?,
                OutputMode::Raw => map.serialize_entry(label, &value.raw_value)?,
            }
        }
        map.end()
    }
}

/// Normalize and group assignments into a snapshot stamped with the current time.
///
/// Unknown keys are skipped. A repeated key keeps its last value.
pub fn assemble(assignments: &[RawAssignment], mode: OutputMode) -> TelemetrySnapshot {
    assemble_with(FieldCatalog::global(), assignments, mode)
}

pub(crate) fn assemble_with(
    catalog: &FieldCatalog,
    assignments: &[RawAssignment],
    mode: OutputMode,
) -> TelemetrySnapshot {
    let mut groups: BTreeMap<String, MeasurementGroup> = BTreeMap::new();

    for assignment in assignments {
        let Some(spec) = catalog.lookup(&assignment.key) else {
            continue;
        };
        let value = normalize(spec, &assignment.value);
        let previous = groups
            .entry(spec.group.to_string())
            .or_default()
            .insert(spec.label.to_string(), value);
        if previous.is_some() {
            trace!(raw_key = spec.raw_key, "Duplicate assignment, keeping the last value");
        }
    }

    TelemetrySnapshot {
        timestamp: Utc::now(),
        mode,
        groups,
    }
}
