use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("droidstate"))
}

fn repo_root() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn sample_capture(name: &str) -> std::path::PathBuf {
    repo_root()
        .join("tests")
        .join("golden")
        .join(name)
        .join("input.bin")
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("decode").and(contains("layout")));
    cmd().arg("decode").arg("--help").assert().success();
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.bin");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn stdout_outputs_json() {
    let assert = cmd()
        .arg("decode")
        .arg(sample_capture("concrete"))
        .arg("--stdout")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["packets"][0]["timestamp"], 1.5);
    assert_eq!(value["packets"][0]["droid_type"], 2);
}

#[test]
fn report_is_written_to_file() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("out").join("report.json");

    cmd()
        .arg("decode")
        .arg(sample_capture("zero"))
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK: 1 packet(s) decoded"));

    let json = std::fs::read_to_string(&report).expect("report written");
    let value: Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["capture_summary"]["frames_decoded"], 1);
}

#[test]
fn missing_report_directories_are_created() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp
        .path()
        .join("reports")
        .join("2026")
        .join("concrete.json");
    assert!(!report.parent().expect("parent").exists());

    cmd()
        .arg("decode")
        .arg(sample_capture("concrete"))
        .arg("-o")
        .arg(&report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("error:").not());

    assert!(report.is_file());
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg(sample_capture("zero"))
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn pretty_and_compact_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg(sample_capture("zero"))
        .arg("-o")
        .arg(report)
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn report_path_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.bin");
    std::fs::write(&input, vec![0u8; droidstate_core::PACKET_SIZE]).expect("write capture");

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("report path must differ from input"));
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg(sample_capture("zero"))
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn list_rejected_outputs_size_mismatch() {
    cmd()
        .arg("decode")
        .arg(sample_capture("sequence"))
        .arg("--stdout")
        .arg("--list-rejected")
        .assert()
        .success()
        .stderr(contains("Rejected frames:").and(contains("got 12 bytes, expected 405")));
}

#[test]
fn strict_fails_when_frames_rejected() {
    cmd()
        .arg("decode")
        .arg(sample_capture("sequence"))
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .failure()
        .stderr(contains("1 frame(s) rejected"));
}

#[test]
fn strict_passes_clean_capture() {
    cmd()
        .arg("decode")
        .arg(sample_capture("concrete"))
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .success();
}

#[test]
fn glob_with_multiple_matches_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    for name in ["a.bin", "b.bin"] {
        std::fs::write(temp.path().join(name), [0u8; 4]).expect("write capture");
    }
    let pattern = temp.path().join("*.bin");

    cmd()
        .arg("decode")
        .arg(pattern)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("multiple files match pattern"));
}

#[test]
fn layout_prints_descriptor() {
    cmd()
        .arg("layout")
        .assert()
        .success()
        .stdout(contains("descriptor: <fB16s2B8f").and(contains("packet bytes: 405")));
}

#[test]
fn layout_json_lists_sections() {
    let assert = cmd().arg("layout").arg("--json").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["packet_bytes"], 405);
    assert_eq!(value["sections"][3]["name"], "servos");
    assert_eq!(value["sections"][3]["count"], 10);
}
