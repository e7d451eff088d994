//! Tests for the `parse` command.

use std::io::Write;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../upsbridge-devices/tests/fixtures")
        .join(name)
}

fn parse_json(args: &[&str]) -> serde_json::Value {
    let output = Command::cargo_bin("upsbridge")
        .unwrap()
        .arg("parse")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_parse_script_fixture() {
    let path = fixture("synoptic_script.js");
    let value = parse_json(&[path.to_str().unwrap()]);

    assert!(value["timestamp"].is_string());
    assert_eq!(value["Battery"]["Remaining backup time"], "42 mn 39 s");
    assert_eq!(value["Battery"]["Temperature"], "unknown");
}

#[test]
fn test_parse_raw_format() {
    let path = fixture("synoptic_script.js");
    let value = parse_json(&[path.to_str().unwrap(), "--format", "raw"]);

    assert_eq!(value["Battery"]["Remaining backup time"], 2559);
    assert!(value["Battery"]["Temperature"].is_null());
}

#[test]
fn test_parse_table_fixture() {
    let path = fixture("synoptic_table.js");
    let value = parse_json(&[path.to_str().unwrap(), "--dialect", "table"]);

    assert_eq!(value["UPS Status"]["Status"], "Online");
}

#[test]
fn test_parse_from_stdin() {
    let mut cmd = Command::cargo_bin("upsbridge").unwrap();
    cmd.arg("parse")
        .arg("-")
        .write_stdin("var ups_status = \"Online\";\nvar ups_battery_level = \"87\";\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"Status\": \"Online\""))
        .stdout(predicate::str::contains("\"Battery load level\": \"87%\""));
}

#[test]
fn test_parse_without_data_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "document.write('<p>nothing here</p>');").unwrap();

    let mut cmd = Command::cargo_bin("upsbridge").unwrap();
    cmd.arg("parse").arg(file.path());

    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_parse_missing_file_fails() {
    let mut cmd = Command::cargo_bin("upsbridge").unwrap();
    cmd.arg("parse").arg("/nonexistent/payload.js");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read payload"));
}

#[test]
fn test_parse_rejects_unknown_format() {
    let path = fixture("synoptic_script.js");
    let mut cmd = Command::cargo_bin("upsbridge").unwrap();
    cmd.arg("parse").arg(path).arg("--format").arg("xml");

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unsupported format"));
}
