//! End-to-end tests for the `status-metrics` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Command isolated from the user's configuration and environment.
fn cmd(home: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("status-metrics");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG");
    for (key, _) in std::env::vars() {
        if key.starts_with("STATUS_METRICS_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

fn with_statuses(cmd: &mut Command) -> &mut Command {
    cmd.args(["-S", "Todo", "-S", "In Progress", "-S", "Done", "--now", "2024-01-01T01:00:00Z"])
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn stats_json_matches_fixture() {
    let home = TempDir::new().unwrap();
    let mut cmd = cmd(&home);
    with_statuses(&mut cmd).args(["stats", "--json"]).arg(fixture_path("items.jsonl"));

    let json = json_stdout(&mut cmd);
    assert_eq!(json["item_count"], 4);
    assert_eq!(json["open_count"], 2);
    assert_eq!(json["avg"]["Todo"], 1050);
    assert_eq!(json["med"]["Todo"], 330);
    assert_eq!(json["90p"]["Todo"], 2630);
    assert_eq!(json["avg"]["Done"], 130);
    assert!(json.get("items").is_none());
}

#[test]
fn stats_per_item_includes_items() {
    let home = TempDir::new().unwrap();
    let mut cmd = cmd(&home);
    with_statuses(&mut cmd)
        .args(["stats", "--per-item", "-o", "json"])
        .arg(fixture_path("items.jsonl"));

    let json = json_stdout(&mut cmd);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0]["id"], "101");
    assert_eq!(items[0]["durations"]["Todo"], 60);
}

#[test]
fn stats_text_table() {
    let home = TempDir::new().unwrap();
    let mut cmd = cmd(&home);
    with_statuses(&mut cmd).arg("stats").arg(fixture_path("items.jsonl"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("4 items (2 open)"))
        .stdout(predicate::str::contains("90p"))
        .stdout(predicate::str::contains("49m 30s"));
}

#[test]
fn stats_over_directory() {
    let home = TempDir::new().unwrap();
    let mut cmd = cmd(&home);
    with_statuses(&mut cmd).args(["stats", "--json"]).arg(fixture_path(""));

    let json = json_stdout(&mut cmd);
    assert_eq!(json["item_count"], 6);
    assert_eq!(json["med"]["Todo"], 60);
}

#[test]
fn durations_tsv_in_seconds() {
    let home = TempDir::new().unwrap();
    let mut cmd = cmd(&home);
    with_statuses(&mut cmd)
        .args(["durations", "-o", "tsv"])
        .arg(fixture_path("items.jsonl"));

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("id\ttitle\tstate\tTodo\tIn Progress\tDone\n"))
        .stdout(predicate::str::contains("101\tCrash on save\tclosed\t60\t-\t130\n"))
        .stdout(predicate::str::contains("104\tImported from page\topen\t600\t2970\t-\n"));
}

#[test]
fn durations_compact_is_one_line_per_item() {
    let home = TempDir::new().unwrap();
    let mut cmd = cmd(&home);
    with_statuses(&mut cmd)
        .args(["durations", "-o", "compact"])
        .arg(fixture_path("items.jsonl"));

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 4);
}

#[test]
fn strict_mode_fails_on_malformed_record() {
    let home = TempDir::new().unwrap();
    let mut cmd = cmd(&home);
    with_statuses(&mut cmd)
        .args(["--strict", "durations"])
        .arg(fixture_path("items.jsonl"));

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("line 3"));
}

#[test]
fn grace_period_flag_changes_result() {
    let home = TempDir::new().unwrap();
    let mut cmd = cmd(&home);
    with_statuses(&mut cmd)
        .args(["--grace-period", "15m", "durations", "--json"])
        .arg(fixture_path("items.jsonl"));

    let json = json_stdout(&mut cmd);
    let late = json
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == "103")
        .unwrap()
        .clone();
    assert_eq!(late["durations"]["In Progress"], 0);
}

#[test]
fn events_from_saved_page() {
    let home = TempDir::new().unwrap();
    let mut cmd = cmd(&home);
    with_statuses(&mut cmd)
        .args(["events", "--json"])
        .arg(fixture_path("issue_page.html"));

    let json = json_stdout(&mut cmd);
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 5);
    assert_eq!(events[0]["kind"], "entered");
    assert_eq!(events[0]["status"], "Todo");
    assert_eq!(events[2]["kind"], "left");
}

#[test]
fn events_text_reports_dropped_records() {
    let home = TempDir::new().unwrap();
    let mut cmd = cmd(&home);
    with_statuses(&mut cmd).arg("events").arg(fixture_path("issue_page.html"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2024-01-01T12:00:00Z"))
        .stderr(predicate::str::contains("5 events from 4 status changes (1 dropped)"));
}

#[test]
fn missing_statuses_is_config_error() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .arg("stats")
        .arg(fixture_path("items.jsonl"))
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("No statuses configured"));
}

#[test]
fn invalid_now_is_usage_error() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["-S", "Todo", "--now", "last tuesday", "stats"])
        .arg(fixture_path("items.jsonl"))
        .assert()
        .failure()
        .code(64);
}

#[test]
fn missing_input_file() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["-S", "Todo", "stats", "does-not-exist.jsonl"])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn statuses_from_project_config() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join(".status-metrics.toml"),
        "[statuses]\nnames = [\"Todo\"]\n",
    )
    .unwrap();

    let mut cmd = cmd(&home);
    cmd.args(["--now", "2024-01-01T01:00:00Z", "stats", "--json"])
        .arg(fixture_path("items.jsonl"));

    let json = json_stdout(&mut cmd);
    assert_eq!(json["avg"]["Todo"], 1050);
    assert!(json["avg"].get("Done").is_none());
}

#[test]
fn config_set_and_get_roundtrip() {
    let home = TempDir::new().unwrap();
    let config: &Path = &home.path().join("custom.toml");

    cmd(&home)
        .arg("--config")
        .arg(config)
        .args(["config", "set", "statuses.names", "Todo,Done"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set statuses.names = Todo,Done"));

    cmd(&home)
        .arg("--config")
        .arg(config)
        .args(["config", "get", "statuses.names"])
        .assert()
        .success()
        .stdout("Todo,Done\n");

    cmd(&home)
        .arg("--config")
        .arg(config)
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure()
        .code(5);
}

#[test]
fn completions_generate() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status-metrics"));
}
