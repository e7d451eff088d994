//! Tests for the `fetch` command.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_fetch_requires_ups_ip() {
    let mut cmd = Command::cargo_bin("upsbridge").unwrap();
    cmd.env_remove("UPS_IP").arg("fetch");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("UPS_IP must be set"));
}

#[test]
fn test_fetch_empty_env_values_use_defaults() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    // An empty scheme or timeout from the environment counts as unset.
    let mut cmd = Command::cargo_bin("upsbridge").unwrap();
    cmd.env("UPS_SCHEME", "")
        .env("UPS_TIMEOUT", "")
        .arg("fetch")
        .arg("--ups-ip")
        .arg(addr);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("UPS request failed"))
        .stderr(predicate::str::contains("invalid value").not());
}

#[test]
fn test_fetch_rejects_invalid_timeout() {
    let mut cmd = Command::cargo_bin("upsbridge").unwrap();
    cmd.arg("fetch")
        .arg("--ups-ip")
        .arg("192.168.0.100")
        .arg("--ups-timeout")
        .arg("soon");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("UPS_TIMEOUT"));
}

#[test]
fn test_fetch_unreachable_card_fails() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let mut cmd = Command::cargo_bin("upsbridge").unwrap();
    cmd.arg("fetch")
        .arg("--ups-ip")
        .arg(addr)
        .arg("--ups-scheme")
        .arg("http")
        .arg("--ups-timeout")
        .arg("1");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("UPS request failed"));
}
