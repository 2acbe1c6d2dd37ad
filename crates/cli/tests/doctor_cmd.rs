use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn doctor_reads_provided_config_path() {
    let tmp = tempdir().unwrap();
    let cfg = tmp.path().join("config.toml");
    fs::write(
        &cfg,
        r#"
version = 1

[defaults]
tries = 50
tolerance = 0.25
bank = "/srv/questions"
"#,
    )
    .unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("randexam"));
    cmd.args(["doctor", "--config", cfg.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OK   randexam doctor"))
        .stdout(predicate::str::contains("defaults.tries:     50"))
        .stdout(predicate::str::contains("defaults.tolerance: 0.25"))
        .stdout(predicate::str::contains("defaults.bank:      /srv/questions"));
}

#[test]
fn doctor_falls_back_to_builtin_defaults() {
    let tmp = tempdir().unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("randexam"));
    cmd.env("XDG_CONFIG_HOME", tmp.path());
    cmd.arg("doctor");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("path: (none, using defaults"))
        .stdout(predicate::str::contains("defaults.tries:     1000"))
        .stdout(predicate::str::contains("defaults.tolerance: 0.5"));
}

#[test]
fn doctor_uses_xdg_default_when_present() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("randexam");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), "version = 1\n[defaults]\ntries = 7\n").unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("randexam"));
    cmd.env("XDG_CONFIG_HOME", tmp.path());
    cmd.arg("doctor");
    cmd.assert().success().stdout(predicate::str::contains("defaults.tries:     7"));
}

#[test]
fn doctor_fails_on_missing_config() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("nope.toml");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("randexam"));
    cmd.args(["doctor", "--config", missing.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("FAIL randexam doctor"))
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn doctor_fails_on_bad_version() {
    let tmp = tempdir().unwrap();
    let cfg = tmp.path().join("config.toml");
    fs::write(&cfg, "version = 2\n").unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("randexam"));
    cmd.args(["doctor", "--config", cfg.to_str().unwrap()]);
    cmd.assert().failure().stdout(predicate::str::contains("FAIL randexam doctor"));
}

#[test]
fn doctor_rejects_non_positive_tolerance() {
    let tmp = tempdir().unwrap();
    let cfg = tmp.path().join("config.toml");
    fs::write(&cfg, "version = 1\n[defaults]\ntolerance = 0.0\n").unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("randexam"));
    cmd.args(["doctor", "--config", cfg.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("defaults.tolerance"));
}
