//! Tests for the `catalog` command.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_catalog_lists_fields() {
    let mut cmd = Command::cargo_bin("upsbridge").unwrap();
    cmd.arg("catalog");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("RAW KEY"))
        .stdout(predicate::str::contains("ups_battery_runtime"))
        .stdout(predicate::str::contains("Remaining backup time"))
        .stdout(predicate::str::contains("ups_output_activepower"));
}

#[test]
fn test_catalog_has_one_line_per_field() {
    let output = Command::cargo_bin("upsbridge")
        .unwrap()
        .arg("catalog")
        .output()
        .unwrap();

    let stdout = String::from_utf8(output.stdout).unwrap();
    // Header plus 21 fields.
    assert_eq!(stdout.lines().count(), 22);
}
