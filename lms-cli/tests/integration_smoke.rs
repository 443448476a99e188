//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `lms` with config and database isolated in a temp dir
fn lms(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lms").unwrap();
    cmd.env("LMS_CONFIG", dir.path().join("config.toml"))
        .env("DATABASE_URL", format!("sqlite://{}", dir.path().join("lms.db").display()))
        .env_remove("LMS_BIND")
        .env_remove("LMS_ADMIN_USERNAME")
        .env_remove("LMS_ADMIN_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

// === Help Tests ===

#[test]
fn test_top_level_help() {
    let mut cmd = Command::cargo_bin("lms").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("user"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("lms").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Address to bind to"))
        .stdout(predicate::str::contains("--database-url"));
}

#[test]
fn test_user_create_help() {
    let mut cmd = Command::cargo_bin("lms").unwrap();
    cmd.arg("user").arg("create").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("admin, instructor or student"));
}

// === Config Command Tests ===

#[test]
fn test_config_path_honours_env() {
    let dir = TempDir::new().unwrap();
    lms(&dir)
        .arg("config")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();

    lms(&dir).arg("config").arg("init").assert().success();
    assert!(dir.path().join("config.toml").exists());

    lms(&dir)
        .arg("config")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    lms(&dir).arg("config").arg("init").arg("--force").assert().success();
}

#[test]
fn test_config_show_redacts_password() {
    let dir = TempDir::new().unwrap();
    lms(&dir)
        .env("LMS_ADMIN_USERNAME", "root")
        .env("LMS_ADMIN_PASSWORD", "hunter2")
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("admin_username = \"root\""))
        .stdout(predicate::str::contains("hunter2").not());
}

// === User Command Tests ===

#[test]
fn test_user_create_and_list() {
    let dir = TempDir::new().unwrap();

    lms(&dir)
        .args(["user", "create", "--username", "prof", "--password", "pw", "--role", "instructor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created instructor 'prof'"));

    lms(&dir)
        .args(["user", "list", "--role", "instructor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prof"));

    lms(&dir)
        .args(["user", "list", "--role", "student"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No users."));
}

#[test]
fn test_user_create_rejects_bad_role() {
    let dir = TempDir::new().unwrap();

    lms(&dir)
        .args(["user", "create", "--username", "someone", "--password", "pw", "--role", "wizard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("role"));
}
