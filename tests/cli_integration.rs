//! Runs the `appenergy` binary for the paths that never reach the network.

use std::process::Command;

fn appenergy() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_appenergy"));
    command
        .env_remove("APPENERGY_TAXONOMY")
        .env_remove("APPENERGY_SOURCE_TIMEOUT_SECS")
        .env_remove("APPENERGY_MAX_RETRIES")
        .env("RUST_LOG", "off");
    command
}

#[test]
fn missing_taxonomy_prints_default_tier_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = appenergy()
        .current_dir(dir.path())
        .args(["--taxonomy", "does-not-exist.json", "gimp"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "moderate-energy-level\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("does-not-exist.json"));
}

#[test]
fn zero_timeout_is_a_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = appenergy()
        .current_dir(dir.path())
        .args(["--timeout", "0", "gimp"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "moderate-energy-level\n");
}

#[test]
fn missing_name_is_a_usage_error() {
    let output = appenergy().output().unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
