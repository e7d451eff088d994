//! Parsing Pipeline Tests
//!
//! End-to-end checks of extract -> normalize -> assemble on captured card
//! payloads in both dialects.

use serde_json::json;
use upsbridge_devices::{
    normalize, parse, screen_payload, Dialect, FailureReason, FieldCatalog, FieldKind, MetricValue,
    OutputMode, TelemetryParser, UNKNOWN_DISPLAY,
};

const SCRIPT_PAYLOAD: &str = include_str!("fixtures/synoptic_script.js");
const TABLE_PAYLOAD: &str = include_str!("fixtures/synoptic_table.js");
const LOGIN_PAGE: &str = include_str!("fixtures/login_page.html");

#[test]
fn test_active_power_alone() {
    let display = parse(r#"ups_output_activepower="0.2";"#, OutputMode::Display)
        .unwrap()
        .to_json();
    let object = display.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(display["AC Output"], json!({"Active Power": "0.2 kW"}));

    let raw = parse(r#"ups_output_activepower="0.2";"#, OutputMode::Raw)
        .unwrap()
        .to_json();
    assert_eq!(raw["AC Output"], json!({"Active Power": 0.2}));
}

#[test]
fn test_battery_runtime() {
    let text = r#"ups_battery_runtime="2559";"#;
    let display = parse(text, OutputMode::Display).unwrap();
    assert_eq!(
        display.display_value("Battery", "Remaining backup time"),
        Some("42 mn 39 s")
    );
    let raw = parse(text, OutputMode::Raw).unwrap().to_json();
    assert_eq!(raw["Battery"]["Remaining backup time"], json!(2559));
}

#[test]
fn test_unknown_bypass_current() {
    let text = r#"ups_bypass_current="unknown";"#;
    let display = parse(text, OutputMode::Display).unwrap().to_json();
    assert_eq!(display["Bypass AC"]["Current"], json!("unknown"));
    let raw = parse(text, OutputMode::Raw).unwrap().to_json();
    assert_eq!(raw["Bypass AC"]["Current"], json!(null));
}

#[test]
fn test_empty_input_is_no_data() {
    let failure = parse("", OutputMode::Display).unwrap_err();
    assert_eq!(failure.reason, FailureReason::NoDataFound);
}

#[test]
fn test_login_page_is_no_data() {
    let failure = parse(LOGIN_PAGE, OutputMode::Display).unwrap_err();
    assert_eq!(failure.reason, FailureReason::NoDataFound);
}

#[test]
fn test_login_fragment_without_doctype_is_no_data() {
    // Fragments like this pass payload screening, so the extractor must reject them.
    let fragment = LOGIN_PAGE
        .split_once("<body>")
        .map(|(_, body)| body)
        .unwrap();
    assert!(screen_payload(Some("application/javascript"), fragment).is_ok());

    let failure = parse(fragment, OutputMode::Raw).unwrap_err();
    assert_eq!(failure.reason, FailureReason::NoDataFound);
}

#[test]
fn test_trailing_comment_keeps_value() {
    let snapshot = parse("var ups_battery_runtime = 2559 // seconds\n", OutputMode::Raw).unwrap();
    assert_eq!(
        snapshot.raw_value("Battery", "Remaining backup time"),
        Some(&MetricValue::Integer(2559))
    );
}

#[test]
fn test_full_script_payload() {
    let snapshot = parse(SCRIPT_PAYLOAD, OutputMode::Display).unwrap();
    assert_eq!(snapshot.groups.len(), 5);
    assert_eq!(snapshot.field_count(), FieldCatalog::global().len());

    assert_eq!(snapshot.display_value("Normal AC", "Voltage"), Some("231 V"));
    assert_eq!(snapshot.display_value("Normal AC", "Current"), Some(UNKNOWN_DISPLAY));
    assert_eq!(snapshot.display_value("AC Output", "Output load level"), Some("23%"));
    assert_eq!(snapshot.display_value("Battery", "Life Time"), Some("46 months"));
    assert_eq!(snapshot.display_value("Battery", "Temperature"), Some(UNKNOWN_DISPLAY));
    assert_eq!(snapshot.display_value("Battery", "Current"), Some("0 A"));
    assert_eq!(snapshot.display_value("UPS Status", "Status"), Some("Online"));
}

#[test]
fn test_table_payload() {
    let snapshot = parse(TABLE_PAYLOAD, OutputMode::Raw).unwrap();
    assert_eq!(
        snapshot.groups.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["AC Output", "Battery", "Normal AC", "UPS Status"]
    );
    assert_eq!(
        snapshot.raw_value("Battery", "Remaining backup time"),
        Some(&MetricValue::Integer(2559))
    );
    assert_eq!(
        snapshot.display_value("Battery", "Remaining backup time"),
        Some("42 mn 39 s")
    );
    // Values carrying their unit are already in display units.
    assert_eq!(snapshot.raw_value("Battery", "Current"), Some(&MetricValue::Float(0.5)));
    assert_eq!(snapshot.display_value("Battery", "Temperature"), Some("25 °C"));
    assert_eq!(snapshot.raw_value("Normal AC", "Current"), Some(&MetricValue::Null));
    assert_eq!(
        snapshot.raw_value("UPS Status", "Status"),
        Some(&MetricValue::String("Online".to_string()))
    );
    assert!(snapshot.get("UPS Status", "Input events").is_none());
}

#[test]
fn test_table_payload_forced_script_dialect() {
    let failure = TelemetryParser::with_dialect(Dialect::Script)
        .parse(TABLE_PAYLOAD, OutputMode::Display)
        .unwrap_err();
    assert_eq!(failure.reason, FailureReason::NoDataFound);
}

#[test]
fn test_parse_is_idempotent() {
    for mode in [OutputMode::Display, OutputMode::Raw] {
        let first = parse(SCRIPT_PAYLOAD, mode).unwrap();
        let second = parse(SCRIPT_PAYLOAD, mode).unwrap();
        assert_eq!(first.groups, second.groups);
        assert_eq!(first.mode, second.mode);
    }
}

#[test]
fn test_raw_matches_display_numbers() {
    let display = parse(SCRIPT_PAYLOAD, OutputMode::Display).unwrap();
    let raw = parse(SCRIPT_PAYLOAD, OutputMode::Raw).unwrap();

    for spec in FieldCatalog::global().iter() {
        if !matches!(spec.kind, FieldKind::Numeric | FieldKind::Percentage) {
            continue;
        }
        let Some(shown) = display.display_value(spec.group, spec.label) else {
            continue;
        };
        let value = raw.raw_value(spec.group, spec.label).unwrap();
        if shown == UNKNOWN_DISPLAY {
            assert!(value.is_null(), "{}", spec.raw_key);
            continue;
        }
        let number: f64 = shown
            .trim_end_matches(spec.unit.unwrap_or(""))
            .trim_end_matches('%')
            .trim()
            .parse()
            .unwrap();
        let raw_number = value.as_f64().unwrap();
        assert!((number - raw_number).abs() < 1e-9, "{}", spec.raw_key);
    }
}

#[test]
fn test_no_empty_groups() {
    for text in [
        SCRIPT_PAYLOAD,
        TABLE_PAYLOAD,
        "var unrelated = 1;",
        r#"ups_status="Online"; ups_flux="9";"#,
    ] {
        let snapshot = parse(text, OutputMode::Display).unwrap();
        assert!(snapshot.groups.values().all(|g| !g.is_empty()));
    }
}

#[test]
fn test_valid_numeric_text_for_every_numeric_field() {
    for spec in FieldCatalog::global()
        .iter()
        .filter(|s| s.kind == FieldKind::Numeric)
    {
        let value = normalize(spec, "12");
        let number = value.raw_value.as_f64().unwrap();
        assert!((number - 12.0 * spec.scale).abs() < 1e-9, "{}", spec.raw_key);
        if let Some(unit) = spec.unit {
            assert!(value.display_string.ends_with(unit), "{}", spec.raw_key);
        }
    }
}

#[test]
fn test_sentinels_for_every_field() {
    for spec in FieldCatalog::global().iter() {
        for text in ["unknown", "-", "", "-Infinity"] {
            let value = normalize(spec, text);
            assert!(value.raw_value.is_null(), "{} {:?}", spec.raw_key, text);
            assert_eq!(value.display_string, UNKNOWN_DISPLAY);
        }
    }
}

#[test]
fn test_timestamp_is_top_level() {
    let json = parse(r#"ups_status="Online";"#, OutputMode::Raw).unwrap().to_json();
    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with("+00:00"));
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}
