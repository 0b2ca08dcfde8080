use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[serial]
port = "/dev/ttyACM0"
baud = 9600
read_timeout_ms = 100
poll_ms = 1

[controller]
kp = 1.0
ki = 0.2
kd = 0.0
n = 10.0
ts = 0.022

[simulator]
period_ms = 1
seed = 7
"#;
    let path = dir.path().join("heli.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[test]
fn help_prints_usage() {
    Command::cargo_bin("heli_cli")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn simulated_run_streams_json_data_frames() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    Command::cargo_bin("heli_cli")
        .unwrap()
        .args([
            "--simulate",
            "--config",
            cfg.to_str().unwrap(),
            "--reference",
            "20.0",
            "--duration-ms",
            "300",
            "--drain-ms",
            "20",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\":\"data\""))
        .stdout(predicate::str::contains("pwm_sw"));
}

#[test]
fn design_target_report_is_one_json_object() {
    Command::cargo_bin("heli_cli")
        .unwrap()
        .args(["--tss", "2.0", "--mp", "0.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\":\"design_target\""))
        .stdout(predicate::str::contains("zeta"));
}

#[test]
fn invalid_overshoot_fails_with_a_clear_message() {
    Command::cargo_bin("heli_cli")
        .unwrap()
        .args(["--tss", "2.0", "--mp", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Mp"));
}

#[test]
fn zero_filter_coefficient_is_rejected_before_start() {
    Command::cargo_bin("heli_cli")
        .unwrap()
        .args(["--simulate", "--n", "0.0", "--duration-ms", "50"])
        .assert()
        .failure();
}

#[test]
fn snapshot_report_lists_poles_and_zeros() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("controller.json");
    fs::write(
        &path,
        r#"{"motor":"static gain","mech":"frictionless","ctrl":"pidf","C_num":[1.0,3.0,2.0],"C_den":[1.0,10.0,0.0]}"#,
    )
    .unwrap();

    Command::cargo_bin("heli_cli")
        .unwrap()
        .args(["--snapshot", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\":\"controller\""))
        .stdout(predicate::str::contains("poles"));
}
