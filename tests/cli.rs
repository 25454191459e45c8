//! Exit codes and output of the bleo-rotate binary

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("jwt_secret.json")
}

fn bleo_rotate(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bleo-rotate").expect("Failed to find bleo-rotate binary");
    cmd.arg("--store").arg(store_path(dir));
    cmd
}

fn corrupt_store(dir: &TempDir) {
    std::fs::write(store_path(dir), "{ not json").expect("Failed to write corrupted store");
}

#[test]
fn test_force_on_empty_store_reports_strength() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    bleo_rotate(&dir)
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rotation count:  1"))
        .stdout(predicate::str::contains("Secret strength: excellent"));

    assert!(store_path(&dir).exists());
}

#[test]
fn test_status_after_rotation() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    bleo_rotate(&dir).arg("--force").assert().success();

    bleo_rotate(&dir)
        .arg("--status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rotation count:  1"))
        .stdout(predicate::str::contains("Next rotation:   -").not());
}

#[test]
fn test_status_on_corrupted_store_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    corrupt_store(&dir);

    bleo_rotate(&dir)
        .arg("--status")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Status:          error"))
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_check_on_empty_store_is_due() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    bleo_rotate(&dir)
        .arg("--check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rotation due"));

    // Checking never writes
    assert!(!store_path(&dir).exists());
}

#[test]
fn test_check_after_rotation_is_not_due() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    bleo_rotate(&dir).assert().success();

    bleo_rotate(&dir)
        .arg("--check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rotation not due"));
}

#[test]
fn test_check_on_corrupted_store_is_unknown() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    corrupt_store(&dir);

    bleo_rotate(&dir)
        .arg("--check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Rotation status unknown"))
        .stdout(predicate::str::contains("Rotation not due").not())
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_rotate_on_corrupted_store_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    corrupt_store(&dir);

    bleo_rotate(&dir).arg("--force").assert().code(1);

    let raw = std::fs::read_to_string(store_path(&dir)).expect("Failed to read store");
    assert_eq!(raw, "{ not json");
}

#[test]
fn test_status_conflicts_with_force() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    bleo_rotate(&dir)
        .args(["--status", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
