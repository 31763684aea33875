use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn voxmeter() -> Command {
    Command::cargo_bin("voxmeter").expect("binary builds")
}

#[test]
fn test_report_renders_latency_table() {
    voxmeter()
        .arg("report")
        .arg(fixture("session.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("=== LATENCY BREAKDOWN (2 turns) ==="))
        .stdout(predicate::str::contains("1.600s"))
        .stdout(predicate::str::contains("412ms"))
        .stdout(predicate::str::contains("812/64"));
}

#[test]
fn test_report_pending_metric_lands_on_turn_one() {
    // The STT sample precedes the first user_speech_stopped in the fixture.
    voxmeter()
        .arg("report")
        .arg(fixture("session.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("0.250s"));
}

#[test]
fn test_report_json_format() {
    let output = voxmeter()
        .arg("report")
        .arg(fixture("session.jsonl"))
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let view: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(view["stats"]["total_turns"], 2);
    assert_eq!(view["turns"][0]["turn_number"], 1);
    assert_eq!(view["turns"][0]["llm_prompt_tokens"], 812);
    assert_eq!(view["turns"][1]["turn_number"], 2);
}

#[test]
fn test_report_empty_log_prints_nothing() {
    let file = tempfile::NamedTempFile::with_suffix(".jsonl").unwrap();

    voxmeter()
        .arg("report")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_report_missing_file_fails() {
    voxmeter()
        .arg("report")
        .arg("/nonexistent/session.jsonl")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_export_csv() {
    let output = voxmeter()
        .arg("export")
        .arg(fixture("session.jsonl"))
        .arg("--format")
        .arg("csv")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let csv = String::from_utf8(output).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("turn_number,"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn test_export_json_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("ledger.json");

    voxmeter()
        .arg("export")
        .arg(fixture("session.jsonl"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let turns: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(turns.as_array().unwrap().len(), 2);
}
