//! Tests for the `serve` command.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_serve_help_lists_settings() {
    let mut cmd = Command::cargo_bin("upsbridge").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("UPS_IP"))
        .stdout(predicate::str::contains("SERVER_API_KEY"))
        .stdout(predicate::str::contains("SNAPSHOT_CACHE_TTL_MS"))
        .stdout(predicate::str::contains("UPS_INSECURE_TLS"));
}

#[test]
fn test_serve_rejects_bad_scheme() {
    let mut cmd = Command::cargo_bin("upsbridge").unwrap();
    cmd.arg("serve")
        .arg("--ups-ip")
        .arg("192.168.0.100")
        .arg("--ups-scheme")
        .arg("ftp")
        .arg("--port")
        .arg("0");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("UPS_SCHEME"));
}
