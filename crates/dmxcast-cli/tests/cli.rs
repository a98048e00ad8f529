use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("dmxcast"))
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("run").and(contains("send")).and(contains("fixtures")));
}

#[test]
fn send_dry_run_prints_frame() {
    cmd()
        .arg("send")
        .arg("--dry-run")
        .arg("--channel")
        .arg("1=200")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(contains("len=512").and(contains("1=200")));
}

#[test]
fn send_applies_multiple_channels_atomically() {
    cmd()
        .arg("send")
        .arg("--dry-run")
        .arg("--channel")
        .arg("1=255")
        .arg("--channel")
        .arg("7=128")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(contains("1=255").and(contains("7=128")));
}

#[test]
fn invalid_channel_spec_shows_error_and_hint() {
    cmd()
        .arg("send")
        .arg("--dry-run")
        .arg("--channel")
        .arg("not-a-spec")
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn out_of_range_channel_is_rejected() {
    cmd()
        .arg("send")
        .arg("--dry-run")
        .arg("--channel")
        .arg("600=1")
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn fixtures_list_uses_embedded_catalog() {
    cmd()
        .arg("fixtures")
        .arg("list")
        .assert()
        .success()
        .stdout(contains("head_el150").and(contains("parcan_l")));
}

#[test]
fn fixtures_list_json_is_valid() {
    let assert = cmd().arg("fixtures").arg("list").arg("--json").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert!(value["fixtures"].is_array());
}

#[test]
fn missing_fixtures_file_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.json");

    cmd()
        .arg("fixtures")
        .arg("list")
        .arg("--fixtures")
        .arg(missing)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn explicit_fixtures_file_is_loaded() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("rig.json");
    std::fs::write(
        &path,
        r#"{
            "fixtures": [{
                "id": "strip_1",
                "name": "LED Strip",
                "type": "color_mixing",
                "channels": {"red": 1, "green": 2, "blue": 3}
            }]
        }"#,
    )
    .expect("write fixtures");

    cmd()
        .arg("fixtures")
        .arg("list")
        .arg("--fixtures")
        .arg(path)
        .assert()
        .success()
        .stdout(contains("strip_1"));
}

#[test]
fn run_dry_run_transmits_and_ends_with_blackout() {
    let assert = cmd()
        .arg("run")
        .arg("--dry-run")
        .arg("--duration")
        .arg("0.2")
        .arg("--fps")
        .arg("50")
        .assert()
        .success()
        .stderr(contains("OK:"));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    // The final forced blackout is always the last frame.
    let last = stdout.lines().last().expect("at least one frame");
    assert!(last.contains("force=true"), "last frame: {last}");
    assert!(last.contains("nonzero=[]"), "last frame: {last}");
}

#[test]
fn run_quiet_suppresses_ok_message() {
    cmd()
        .arg("run")
        .arg("--dry-run")
        .arg("--duration")
        .arg("0.1")
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn run_rejects_nonpositive_fps() {
    cmd()
        .arg("run")
        .arg("--dry-run")
        .arg("--fps")
        .arg("0")
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}
