//! End-to-end tests for the `biathlon` binary.
//!
//! Tests the full pipeline: config file + event log → event lines + report.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn biathlon_binary() -> String {
    env!("CARGO_BIN_EXE_biathlon").to_string()
}

const CONFIG: &str = r#"{
    "laps": 2,
    "lapLen": 3500,
    "penaltyLen": 150,
    "firingLines": 2,
    "start": "09:30:00",
    "startDelta": "00:01:30"
}"#;

const EVENTS: &str = "\
[09:05:59.867] 1 1
[09:06:10.000] 1 2
[09:15:00.841] 2 1 09:30:00.000
[09:15:01.000] 2 2 09:31:00.000
[09:29:45.734] 3 1
[09:30:01.005] 4 1
[09:33:00.000] 4 2
[09:40:00.000] 5 1 1
[09:40:01.000] 6 1 1
[09:40:02.000] 6 1 2
[09:40:03.000] 6 1 3
[09:40:10.000] 7 1
[09:40:20.000] 8 1
[09:41:20.000] 9 1
[10:00:00.000] 10 1
[10:10:00.000] 5 1 2
[10:10:01.000] 6 1 1
[10:10:02.000] 6 1 2
[10:10:03.000] 6 1 3
[10:10:04.000] 6 1 4
[10:10:05.000] 6 1 5
[10:10:10.000] 7 1
[10:25:00.000] 10 1
";

/// Writes config and events into a fresh temp directory.
fn race_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.json"), CONFIG).unwrap();
    std::fs::write(temp.path().join("events"), EVENTS).unwrap();
    temp
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(biathlon_binary())
        .current_dir(dir)
        .env_remove("BIATHLON_CONFIG")
        .env_remove("BIATHLON_EVENTS")
        .args(args)
        .output()
        .expect("failed to run biathlon")
}

fn report_lines(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .filter(|line| {
            line.starts_with("[NotStarted]")
                || line.starts_with("[NotFinished]")
                || line.starts_with("[00:")
                || line.starts_with("[01:")
        })
        .collect()
}

#[test]
fn test_full_race_from_files() {
    let temp = race_dir();

    let output = run_in(temp.path(), &["--events", "events"]);

    assert!(
        output.status.success(),
        "biathlon should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(stdout.starts_with("[09:05:59.867] The competitor(1) registered\n"));
    assert!(stdout.contains(
        "[09:33:00.000] The competitor(2) has started\n[09:33:00.000] The competitor(2) is disqualified\n"
    ));
    assert!(stdout.contains("[10:25:00.000] The competitor(1) has finished\n"));
    assert_eq!(
        report_lines(&stdout),
        vec![
            "[NotStarted] 2 [{00:02:00.000, 29.167}] {,} 0/10",
            "[00:55:00.000] 1 [{00:30:00.000, 1.944}, {00:25:00.000, 2.333}] {00:01:00.000, 5.000} 8/10",
        ]
    );
}

#[test]
fn test_report_written_to_output_file() {
    let temp = race_dir();

    let output = run_in(
        temp.path(),
        &["--events", "events", "--output", "results.txt"],
    );

    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "stdout should stay empty");
    let written = std::fs::read_to_string(temp.path().join("results.txt")).unwrap();
    assert!(written.ends_with("{00:01:00.000, 5.000} 8/10\n"));
}

#[test]
fn test_events_from_stdin_with_env_config() {
    let temp = race_dir();
    let config_path = temp.path().join("config.json");

    let mut child = Command::new(biathlon_binary())
        .current_dir(temp.path())
        .env("BIATHLON_CONFIG", &config_path)
        .env_remove("BIATHLON_EVENTS")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn biathlon");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"[09:00:00] 1 7\n[09:10:00] 11 7 Broken ski\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "[09:00:00.000] The competitor(7) registered\n\
         [09:10:00.000] The competitor(7) can't continue: Broken ski\n\
         [NotFinished] 7 [] {,} 0/10\n"
    );
}

#[test]
fn test_malformed_lines_are_reported_not_fatal() {
    let temp = race_dir();
    std::fs::write(
        temp.path().join("events"),
        "[09:00:00] 1 1\n[09:00:01] 99 1\n[09:00:02] 9 1\n",
    )
    .unwrap();

    let output = run_in(temp.path(), &["--events", "events"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "[09:00:00.000] The competitor(1) registered\n\
         [ERROR] parse failed, event ignored: unknown event id 99\n\
         [09:00:02.000] The competitor(1) left the penalty laps\n\
         [ERROR] update failed, event ignored: invalid event data: finishing a penalty loop never started\n"
    );
}

#[test]
fn test_json_format() {
    let temp = race_dir();

    let output = run_in(temp.path(), &["--events", "events", "--format", "json"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let results: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["outcome"]["status"], "not_started");
    assert_eq!(results[1]["outcome"]["time"], "00:55:00.000");
    assert_eq!(results[1]["penalty"]["speed"], 5.0);
}

#[test]
fn test_missing_config_fails() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("events"), EVENTS).unwrap();

    let output = run_in(temp.path(), &["--events", "events"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to load race configuration"),
        "unexpected stderr: {stderr}"
    );
}
