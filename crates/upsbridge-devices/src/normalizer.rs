//! Value normalization.
//!
//! Turns the card's display-oriented value text into a display string and a
//! typed machine value, one rule per [`FieldKind`]. A value that cannot be
//! interpreted degrades to `unknown`/`null` for that field only.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{FieldKind, FieldSpec};

/// Literal shown for any value the card could not provide.
pub const UNKNOWN_DISPLAY: &str = "unknown";

/// Leading number followed by an optional unit suffix.
static NUMBER_WITH_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*(.*?)\s*$")
        .expect("number pattern is valid")
});

/// `1 h 2 mn 3 s` style durations, every component optional.
static DISPLAY_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+)\s*h)?\s*(?:(\d+)\s*mn)?\s*(?:(\d+)\s*s)?$")
        .expect("duration pattern is valid")
});

/// Machine value of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A field value in both of its output representations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedValue {
    /// Human-readable form, never empty.
    pub display_string: String,
    /// Typed form, `Null` for sentinels.
    pub raw_value: MetricValue,
}

impl NormalizedValue {
    pub fn unknown() -> Self {
        Self {
            display_string: UNKNOWN_DISPLAY.to_string(),
            raw_value: MetricValue::Null,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.raw_value.is_null()
    }

    fn number(value: f64, unit: Option<&str>) -> Self {
        let number = format_number(value);
        let display_string = match unit {
            Some(unit) => format!("{} {}", number, unit),
            None => number,
        };
        Self {
            display_string,
            raw_value: MetricValue::Float(value),
        }
    }
}

/// Normalize one raw value according to its catalog entry.
pub fn normalize(spec: &FieldSpec, raw_text: &str) -> NormalizedValue {
    let text = raw_text.trim();
    if spec.is_sentinel(text) {
        return NormalizedValue::unknown();
    }

    let normalized = match spec.kind {
        FieldKind::Numeric => normalize_numeric(spec, text),
        FieldKind::Percentage => normalize_percentage(spec, text),
        FieldKind::DurationSeconds => normalize_duration(text),
        FieldKind::PassthroughString => Some(normalize_passthrough(spec, text)),
    };

    normalized.unwrap_or_else(|| {
        debug!(
            raw_key = spec.raw_key,
            kind = %spec.kind,
            value = text,
            "Value does not parse for its kind, reporting unknown"
        );
        NormalizedValue::unknown()
    })
}

fn normalize_numeric(spec: &FieldSpec, text: &str) -> Option<NormalizedValue> {
    let value = numeric_value(spec, text)?;
    Some(NormalizedValue::number(value, spec.unit))
}

fn normalize_percentage(spec: &FieldSpec, text: &str) -> Option<NormalizedValue> {
    let (value, suffix) = split_number(text)?;
    let value = match suffix {
        "" => apply_scale(value, spec.scale),
        "%" => value,
        _ => return None,
    };
    Some(NormalizedValue {
        display_string: format!("{}%", format_number(value)),
        raw_value: MetricValue::Float(value),
    })
}

fn normalize_duration(text: &str) -> Option<NormalizedValue> {
    let seconds = duration_seconds(text)?;
    Some(NormalizedValue {
        display_string: format_duration(seconds),
        raw_value: MetricValue::Integer(seconds),
    })
}

fn normalize_passthrough(spec: &FieldSpec, text: &str) -> NormalizedValue {
    match numeric_value(spec, text) {
        Some(value) => NormalizedValue::number(value, spec.unit),
        None => NormalizedValue {
            display_string: text.to_string(),
            raw_value: MetricValue::String(text.to_string()),
        },
    }
}

/// Numeric reading in display units.
///
/// A bare number is in the device's native unit and gets the field's scale.
/// A number carrying the declared unit is already in display units.
fn numeric_value(spec: &FieldSpec, text: &str) -> Option<f64> {
    let (value, suffix) = split_number(text)?;
    if suffix.is_empty() {
        return Some(apply_scale(value, spec.scale));
    }
    match spec.unit {
        Some(unit) if suffix.eq_ignore_ascii_case(unit) => Some(value),
        _ => None,
    }
}

fn duration_seconds(text: &str) -> Option<i64> {
    if let Some((value, "")) = split_number(text) {
        if value < 0.0 || value.fract() != 0.0 || value > i64::MAX as f64 {
            return None;
        }
        return Some(value as i64);
    }

    let captures = DISPLAY_DURATION.captures(text)?;
    if captures.iter().skip(1).all(|c| c.is_none()) {
        return None;
    }
    let component = |index: usize| -> Option<i64> {
        match captures.get(index) {
            Some(m) => m.as_str().parse::<i64>().ok(),
            None => Some(0),
        }
    };
    let hours = component(1)?;
    let minutes = component(2)?;
    let seconds = component(3)?;
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// Split `"<number> <suffix>"` into the parsed number and the trimmed suffix.
pub(crate) fn split_number(text: &str) -> Option<(f64, &str)> {
    let captures = NUMBER_WITH_SUFFIX.captures(text)?;
    let number = captures.get(1)?.as_str().parse::<f64>().ok()?;
    if !number.is_finite() {
        return None;
    }
    let suffix = captures.get(2).map_or("", |m| m.as_str());
    Some((number, suffix))
}

fn apply_scale(value: f64, scale: f64) -> f64 {
    if scale == 1.0 {
        return value;
    }
    // Round off the binary noise the multiplication leaves behind (52 * 0.1).
    ((value * scale) * 1e6).round() / 1e6
}

/// Shortest decimal form that round-trips (`235`, `0.2`, `49.9`).
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Render total seconds as `<minutes> mn <seconds> s`.
pub fn format_duration(total_seconds: i64) -> String {
    format!("{} mn {} s", total_seconds / 60, total_seconds % 60)
}
