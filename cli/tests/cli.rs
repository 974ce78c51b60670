use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const SCRIPT: &str = "\
Title: Night Shift
===
# Act One
#### Panel 1: The Lot
00:04
[i] lot.png
INT. ROOM - DAY

ALICE
Where is everyone?
Hello?

BOB
Here.
";

fn bin() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_screenplay"));
    command.env_remove("RUST_LOG");
    command
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str], cwd: &Path) -> Output {
    bin().args(args).current_dir(cwd).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn preview_prints_blocks() {
    let dir = TempDir::new().unwrap();
    write(&dir, "night.fountain", SCRIPT);
    let output = run(&["preview", "night.fountain"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("scene_heading.int"));
    assert!(text.contains("ROOM - DAY"));
    assert!(text.contains("title: Night Shift"));
}

#[test]
fn preview_is_the_default_subcommand() {
    let dir = TempDir::new().unwrap();
    write(&dir, "night.fountain", SCRIPT);
    let explicit = run(&["preview", "night.fountain"], dir.path());
    let implicit = run(&["night.fountain"], dir.path());
    assert!(implicit.status.success(), "{}", stderr(&implicit));
    assert_eq!(stdout(&explicit), stdout(&implicit));
}

#[test]
fn preview_json() {
    let dir = TempDir::new().unwrap();
    write(&dir, "night.fountain", SCRIPT);
    let output = run(&["preview", "--json", "night.fountain"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["blocks"][0]["type"], "title_page");
    assert_eq!(json["characters"], serde_json::json!(["ALICE", "BOB"]));
    assert_eq!(json["characterLineCounts"]["ALICE"], 2);
}

#[test]
fn config_selects_json_output() {
    let dir = TempDir::new().unwrap();
    write(&dir, "night.fountain", SCRIPT);
    write(&dir, "custom.toml", "[output]\nformat = \"json\"\n");
    let output = run(&["--config", "custom.toml", "night.fountain"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["titlePage"]["fields"][0]["key"], "title");
}

#[test]
fn config_in_working_directory_is_picked_up() {
    let dir = TempDir::new().unwrap();
    write(&dir, "night.fountain", SCRIPT);
    write(&dir, "screenplay.toml", "[output]\nformat = \"json\"\n");
    let output = run(&["characters", "night.fountain"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["characterLineCounts"]["BOB"], 1);
}

#[test]
fn invalid_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    write(&dir, "night.fountain", SCRIPT);
    write(&dir, "screenplay.toml", "[output]\nformat = \"yaml\"\n");
    let output = run(&["night.fountain"], dir.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("invalid config"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let output = run(&["preview", "nope.fountain"], dir.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("cannot read"));
}

#[test]
fn characters_text() {
    let dir = TempDir::new().unwrap();
    write(&dir, "night.fountain", SCRIPT);
    let output = run(&["characters", "night.fountain"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "ALICE  2\nBOB    1\n");
}

#[test]
fn panels_text() {
    let dir = TempDir::new().unwrap();
    write(&dir, "night.fountain", SCRIPT);
    let output = run(&["panels", "night.fountain"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("1. The Lot  [0:04]  lines 4-14"));
    assert!(text.contains("in Act One"));
    assert!(text.contains("image lot.png"));
    assert!(text.contains("total 0:04 across 1 panel(s)"));
}

#[test]
fn check_reports_notices() {
    let dir = TempDir::new().unwrap();
    write(&dir, "orphan.fountain", "[i] lost.png\n#### P\nText.\n");

    let output = run(&["--no-color", "check", "orphan.fountain"], dir.path());
    assert!(output.status.success());
    let err = stderr(&output);
    assert!(err.contains("orphaned-metadata"), "{}", err);
    assert!(err.contains("1 notice(s)"), "{}", err);

    let denied = run(&["--no-color", "check", "--deny-notices", "orphan.fountain"], dir.path());
    assert_eq!(denied.status.code(), Some(1));
}

#[test]
fn check_clean_script() {
    let dir = TempDir::new().unwrap();
    write(&dir, "night.fountain", SCRIPT);
    let output = run(&["--no-color", "check", "--deny-notices", "night.fountain"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("0 notice(s)"));
}

#[test]
fn record_input() {
    let dir = TempDir::new().unwrap();
    let record = serde_json::json!({
        "script": {
            "id": 3,
            "title": "Pilot",
            "source": SCRIPT,
            "created_at": "2024-01-01 10:00:00",
            "updated_at": "2024-01-02 10:00:00"
        }
    });
    write(&dir, "pilot.json", &record.to_string());
    let output = run(&["characters", "--record", "pilot.json"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "ALICE  2\nBOB    1\n");

    write(&dir, "missing.json", r#"{"error":"Script not found"}"#);
    let output = run(&["characters", "--record", "missing.json"], dir.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Script not found"));
}

#[test]
fn render_writes_html() {
    let dir = TempDir::new().unwrap();
    write(&dir, "night.fountain", SCRIPT);
    let output = run(&["render", "night.fountain", "-o", "night.html"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    let html = fs::read_to_string(dir.path().join("night.html")).unwrap();
    assert!(html.contains("<title>Night Shift</title>"));
    assert!(html.contains(r#"data-type="scene_heading""#));
}

#[test]
fn render_title_from_config() {
    let dir = TempDir::new().unwrap();
    write(&dir, "night.fountain", SCRIPT);
    write(&dir, "screenplay.toml", "[render]\ntitle = \"Table Read\"\n");
    let output = run(&["render", "night.fountain"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("<title>Table Read</title>"));
}

#[test]
fn fixture_suite_passes() {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let output = bin()
        .args(["--no-color", "test"])
        .arg(&fixtures)
        .output()
        .unwrap();
    let err = stderr(&output);
    assert!(output.status.success(), "{}", err);
    assert!(err.contains("test result: ok."), "{}", err);
    assert!(!err.contains("FAIL"), "{}", err);
}

#[test]
fn fixture_failures_are_reported() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "wrong.test.fountain",
        "---\nexpect_characters = [\"BOB\"]\n---\nALICE\nHi.\n",
    );
    let output = run(&["--no-color", "test", "."], dir.path());
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("FAIL  wrong"), "{}", err);
    assert!(err.contains("character mismatch"), "{}", err);
}
