//! Field catalog for the Network-MS synoptic measurement page.
//!
//! The catalog is configuration, not logic: one row per raw key the card
//! firmware is known to emit. Keep it in sync with the firmware key set.
//!
//! | Raw key | Group | Label | Kind | Unit |
//! |---------|-------|-------|------|------|
//! | `ups_input_voltage` | Normal AC | Voltage | numeric | V |
//! | `ups_output_activepower` | AC Output | Active Power | numeric | kW |
//! | `ups_battery_runtime` | Battery | Remaining backup time | duration | - |
//! | `ups_battery_current` | Battery | Current | numeric (deciamps, x0.1) | A |
//! | ... | | | | |

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::normalizer::split_number;

/// How a field's raw text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Floating point value with an electrical/physical unit.
    Numeric,
    /// Floating point value rendered with a `%` suffix. Never divided by 100.
    Percentage,
    /// Integer total seconds rendered as `<m> mn <s> s`.
    DurationSeconds,
    /// Value that is already the display token (numeric with a literal-text
    /// unit such as "months", or plain text such as "Online").
    PassthroughString,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Percentage => write!(f, "percentage"),
            Self::DurationSeconds => write!(f, "duration"),
            Self::PassthroughString => write!(f, "passthrough"),
        }
    }
}

/// A raw token meaning "value unavailable".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Sentinel {
    /// Literal marker, compared case-insensitively after trimming.
    Literal(&'static str),
    /// `-Infinity` / `-inf`, emitted by the card's script for missing floats.
    NegativeInfinity,
    /// Any negative number.
    Negative,
    /// A fixed magic number.
    Magic(f64),
}

impl Sentinel {
    /// Check whether the raw text is this sentinel.
    pub fn matches(&self, text: &str) -> bool {
        let trimmed = text.trim();
        match self {
            Self::Literal(marker) => trimmed.eq_ignore_ascii_case(marker),
            Self::NegativeInfinity => {
                trimmed.eq_ignore_ascii_case("-infinity") || trimmed.eq_ignore_ascii_case("-inf")
            }
            Self::Negative => split_number(trimmed).is_some_and(|(n, _)| n < 0.0),
            Self::Magic(magic) => split_number(trimmed).is_some_and(|(n, _)| n == *magic),
        }
    }
}

/// Markers the card renders for every field it cannot measure.
pub const DEFAULT_SENTINELS: &[Sentinel] = &[
    Sentinel::Literal("unknown"),
    Sentinel::Literal("-"),
    Sentinel::Literal("n/a"),
    Sentinel::Literal(""),
    Sentinel::NegativeInfinity,
];

/// Runtime is reported as -1 while the battery is being characterised.
const RUNTIME_SENTINELS: &[Sentinel] = &[
    Sentinel::Literal("unknown"),
    Sentinel::Literal("-"),
    Sentinel::Literal("n/a"),
    Sentinel::Literal(""),
    Sentinel::NegativeInfinity,
    Sentinel::Negative,
];

/// Temperature probes that are not fitted report absolute zero.
const TEMPERATURE_SENTINELS: &[Sentinel] = &[
    Sentinel::Literal("unknown"),
    Sentinel::Literal("-"),
    Sentinel::Literal("n/a"),
    Sentinel::Literal(""),
    Sentinel::NegativeInfinity,
    Sentinel::Magic(-273.0),
];

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub raw_key: &'static str,
    pub group: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    /// Multiplier from the device's native unit to the display unit.
    pub scale: f64,
    pub sentinels: &'static [Sentinel],
}

impl FieldSpec {
    const fn new(
        raw_key: &'static str,
        group: &'static str,
        label: &'static str,
        kind: FieldKind,
        unit: Option<&'static str>,
    ) -> Self {
        Self {
            raw_key,
            group,
            label,
            kind,
            unit,
            scale: 1.0,
            sentinels: DEFAULT_SENTINELS,
        }
    }

    const fn scaled(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    const fn with_sentinels(mut self, sentinels: &'static [Sentinel]) -> Self {
        self.sentinels = sentinels;
        self
    }

    /// Check the raw text against this field's sentinel set.
    pub fn is_sentinel(&self, text: &str) -> bool {
        self.sentinels.iter().any(|s| s.matches(text))
    }
}

const NORMAL_AC: &str = "Normal AC";
const BYPASS_AC: &str = "Bypass AC";
const AC_OUTPUT: &str = "AC Output";
const BATTERY: &str = "Battery";
const UPS_STATUS: &str = "UPS Status";

use FieldKind::{DurationSeconds, Numeric, PassthroughString, Percentage};

static FIELDS: &[FieldSpec] = &[
    FieldSpec::new("ups_input_voltage", NORMAL_AC, "Voltage", Numeric, Some("V")),
    FieldSpec::new("ups_input_frequency", NORMAL_AC, "Frequency", Numeric, Some("Hz")),
    FieldSpec::new("ups_input_current", NORMAL_AC, "Current", Numeric, Some("A")),
    FieldSpec::new("ups_bypass_voltage", BYPASS_AC, "Voltage", Numeric, Some("V")),
    FieldSpec::new("ups_bypass_frequency", BYPASS_AC, "Frequency", Numeric, Some("Hz")),
    FieldSpec::new("ups_bypass_current", BYPASS_AC, "Current", Numeric, Some("A")),
    FieldSpec::new("ups_output_voltage", AC_OUTPUT, "Voltage", Numeric, Some("V")),
    FieldSpec::new("ups_output_frequency", AC_OUTPUT, "Frequency", Numeric, Some("Hz")),
    FieldSpec::new("ups_output_current", AC_OUTPUT, "Current", Numeric, Some("A")),
    FieldSpec::new("ups_output_activepower", AC_OUTPUT, "Active Power", Numeric, Some("kW")),
    FieldSpec::new("ups_output_apparentpower", AC_OUTPUT, "Apparent Power", Numeric, Some("kVA")),
    FieldSpec::new("ups_output_powerfactor", AC_OUTPUT, "Power Factor", Numeric, None),
    FieldSpec::new("ups_output_load", AC_OUTPUT, "Output load level", Percentage, None),
    FieldSpec::new("ups_battery_level", BATTERY, "Battery load level", Percentage, None),
    FieldSpec::new("ups_battery_runtime", BATTERY, "Remaining backup time", DurationSeconds, None)
        .with_sentinels(RUNTIME_SENTINELS),
    FieldSpec::new("ups_battery_voltage", BATTERY, "Voltage", Numeric, Some("V")),
    // Bare values are taken as deciamps. Unverified against card firmware: only
    // unit-carrying table values ("0.5 A") have been observed, and those skip the scale.
    FieldSpec::new("ups_battery_current", BATTERY, "Current", Numeric, Some("A")).scaled(0.1),
    FieldSpec::new("ups_battery_lifetime", BATTERY, "Life Time", PassthroughString, Some("months")),
    FieldSpec::new("ups_battery_temperature", BATTERY, "Temperature", Numeric, Some("°C"))
        .with_sentinels(TEMPERATURE_SENTINELS),
    FieldSpec::new("ups_status", UPS_STATUS, "Status", PassthroughString, None),
    FieldSpec::new("ups_operating_mode", UPS_STATUS, "Operating mode", PassthroughString, None),
];

static CATALOG: Lazy<FieldCatalog> = Lazy::new(|| FieldCatalog::from_fields(FIELDS));

/// Read-only index over the static field table.
#[derive(Debug)]
pub struct FieldCatalog {
    fields: &'static [FieldSpec],
    by_key: HashMap<&'static str, usize>,
    by_label: HashMap<(String, String), usize>,
}

impl FieldCatalog {
    fn from_fields(fields: &'static [FieldSpec]) -> Self {
        let mut by_key = HashMap::with_capacity(fields.len());
        let mut by_label = HashMap::with_capacity(fields.len());
        for (index, spec) in fields.iter().enumerate() {
            by_key.insert(spec.raw_key, index);
            by_label.insert(label_key(spec.group, spec.label), index);
        }
        Self {
            fields,
            by_key,
            by_label,
        }
    }

    /// The process-wide catalog.
    pub fn global() -> &'static FieldCatalog {
        &CATALOG
    }

    /// Look up a field by its raw script key.
    pub fn lookup(&self, raw_key: &str) -> Option<&'static FieldSpec> {
        let fields = self.fields;
        self.by_key.get(raw_key).map(|&i| &fields[i])
    }

    /// Look up a field by its display group and label (case-insensitive).
    pub fn lookup_label(&self, group: &str, label: &str) -> Option<&'static FieldSpec> {
        let fields = self.fields;
        self.by_label
            .get(&label_key(group, label))
            .map(|&i| &fields[i])
    }

    pub fn contains(&self, raw_key: &str) -> bool {
        self.by_key.contains_key(raw_key)
    }

    /// All entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter()
    }

    /// Distinct group names in declaration order.
    pub fn groups(&self) -> Vec<&'static str> {
        let mut groups: Vec<&'static str> = Vec::new();
        for spec in self.fields {
            if !groups.contains(&spec.group) {
                groups.push(spec.group);
            }
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn label_key(group: &str, label: &str) -> (String, String) {
    (group.trim().to_lowercase(), label.trim().to_lowercase())
}

/// Look up a raw key in the global catalog.
pub fn lookup(raw_key: &str) -> Option<&'static FieldSpec> {
    FieldCatalog::global().lookup(raw_key)
}
