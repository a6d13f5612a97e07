// Integration tests for the despertar replay binary

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const TRACE: &str = r#"{"type":"wakeup","elapsed":1000,"uptime":900,"reason":"200 alarm_device"}
{"type":"activity","subsystem":1,"elapsed":1200,"uids":[1000,2000]}
{"type":"activity","subsystem":2,"elapsed":4800,"uids":[77]}
{"type":"wakeup","elapsed":5000,"uptime":4900,"reason":"171 wlan_pci"}
{"type":"wakeup","elapsed":9000,"uptime":8900,"reason":"Abort: busy"}
"#;

fn write_trace(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("trace.jsonl");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_replay_text_output() {
    let tmp_dir = TempDir::new().unwrap();
    let trace = write_trace(&tmp_dir, TRACE);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("despertar");
    cmd.arg(&trace);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Replayed 3 wakeups (1 unsupported), 2 activities (1 matched on arrival, 1 pending)",
        ))
        .stdout(predicate::str::contains("Alarm: [1000, 2000]"))
        .stdout(predicate::str::contains("Wifi: [77]"))
        .stdout(predicate::str::contains("Alarm: 1 attributed / 1 total"));
}

#[test]
fn test_replay_json_output() {
    let tmp_dir = TempDir::new().unwrap();
    let trace = write_trace(&tmp_dir, TRACE);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("despertar");
    cmd.arg("--format").arg("json").arg(&trace);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["wakeups"], 3);
    assert_eq!(report["summary"]["matched_activities"], 1);
    assert_eq!(report["snapshot"]["wakeups"][0]["elapsed"], 9000);
    assert_eq!(report["snapshot"]["wakeups"][0]["supported"], false);
}

#[test]
fn test_replay_narrow_window() {
    let tmp_dir = TempDir::new().unwrap();
    let trace = write_trace(&tmp_dir, TRACE);

    // 100ms window: activity 200ms after the alarm wakeup no longer matches
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("despertar");
    cmd.arg("--window").arg("100").arg(&trace);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("(0 matched on arrival, 2 pending)"))
        .stdout(predicate::str::contains("Alarm: 0 attributed / 1 total"));
}

#[test]
fn test_replay_custom_subsystem_table() {
    let tmp_dir = TempDir::new().unwrap();
    let trace = write_trace(
        &tmp_dir,
        r#"{"type":"wakeup","elapsed":100,"reason":"88 bt_host_wake"}
{"type":"activity","subsystem":17,"elapsed":150,"uids":[5]}
"#,
    );
    let table = tmp_dir.path().join("subsystems.toml");
    fs::write(
        &table,
        r#"
[[subsystem]]
name = "Bluetooth"
id = 17
devices = ["bt_host_wake"]
"#,
    )
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("despertar");
    cmd.arg("--subsystems").arg(&table).arg(&trace);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Bluetooth: [5]"));
}

#[test]
fn test_replay_config_file() {
    let tmp_dir = TempDir::new().unwrap();
    let trace = write_trace(&tmp_dir, TRACE);
    let config = tmp_dir.path().join("engine.toml");
    fs::write(&config, "matching_window_ms = 50\ndump_limit = 1\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("despertar");
    cmd.arg("--config").arg(&config).arg(&trace);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("window ±50ms"))
        .stdout(predicate::str::contains("2 older wakeups omitted"));
}

#[test]
fn test_replay_missing_trace_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("despertar");
    cmd.arg("/nonexistent/trace.jsonl");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read trace"));
}

#[test]
fn test_replay_malformed_trace_reports_line() {
    let tmp_dir = TempDir::new().unwrap();
    let trace = write_trace(
        &tmp_dir,
        "{\"type\":\"wakeup\",\"elapsed\":1,\"reason\":\"1 rtc0\"}\nnot json\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("despertar");
    cmd.arg(&trace);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_replay_invalid_window_rejected() {
    let tmp_dir = TempDir::new().unwrap();
    let trace = write_trace(&tmp_dir, TRACE);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("despertar");
    cmd.arg("--window=-5").arg(&trace);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for --window"));
}

#[test]
fn test_replay_recorded_fixture() {
    let fixture = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("overnight.jsonl");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("despertar");
    cmd.arg(&fixture);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Replayed 4 wakeups (1 unsupported), 4 activities (2 matched on arrival, 2 pending)",
        ))
        .stdout(predicate::str::contains("Alarm: [10023, 10045]"))
        .stdout(predicate::str::contains("Wifi: [1000]"))
        .stdout(predicate::str::contains("Unknown: []"))
        .stdout(predicate::str::contains("Sensor: [10077]"))
        .stdout(predicate::str::contains("Alarm: 1 attributed / 2 total"));
}
