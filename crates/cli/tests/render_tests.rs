// Integration tests for `pgrid render` and `pgrid manifest`.
//
// Run with: cargo test -p pivotgrid-cli --test render_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const TASKS_CSV: &str = "Owner,Stage,Title\nAda,Todo,Write\nBo,Done,Ship\nAda,Done,\n";

/// `pgrid` with an empty user config dir, so only `--settings` can change
/// the defaults.
fn pgrid(config_home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pgrid"));
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd.env_remove("PGRID_SETTINGS");
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(dir: &TempDir, args: &[&str]) -> Output {
    pgrid(dir.path()).args(args).output().expect("run pgrid")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn render_csv(dir: &TempDir, extra: &[&str]) -> Output {
    let csv = write(dir, "tasks.csv", TASKS_CSV);
    let mut args = vec![
        "render",
        csv.to_str().unwrap(),
        "--csv",
        "--row",
        "Owner",
        "--column",
        "Stage",
        "--content",
        "Title",
    ];
    args.extend_from_slice(extra);
    pgrid(dir.path()).args(&args).output().expect("run pgrid")
}

// ===========================================================================
// Text output
// ===========================================================================

#[test]
fn csv_renders_text_grid() {
    let dir = TempDir::new().unwrap();
    let out = stdout(&render_csv(&dir, &[]));

    let expected = "    | Done   | Todo\n\
                    ----+--------+--------\n\
                    Ada |   —    |   Write\n\
                    Bo  |   Ship |\n";
    assert_eq!(out, expected);
}

#[test]
fn select_marks_record() {
    let dir = TempDir::new().unwrap();
    // Record 2 is Bo/Done/Ship
    let out = stdout(&render_csv(&dir, &["--select", "2"]));
    assert!(out.contains("Bo  |  *Ship"), "got:\n{out}");
}

#[test]
fn keys_move_focus_and_activate() {
    let dir = TempDir::new().unwrap();
    let out = stdout(&render_csv(&dir, &["--keys", "right,enter"]));
    assert!(out.contains("Ada |   —    | >*Write"), "got:\n{out}");
}

#[test]
fn settings_file_changes_placeholder() {
    let dir = TempDir::new().unwrap();
    let settings = write(&dir, "settings.json", r#"{"grid.emptyContentPlaceholder": "(none)"}"#);
    let out = stdout(&render_csv(&dir, &["--settings", settings.to_str().unwrap()]));
    assert!(out.contains("(none)"));
    assert!(!out.contains('—'));
}

#[test]
fn csv_without_mapping_waits() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "tasks.csv", TASKS_CSV);
    let out = stdout(&run(&dir, &["render", csv.to_str().unwrap(), "--csv"]));
    assert_eq!(out, "Waiting for column mappings...\n");
}

// ===========================================================================
// JSON output
// ===========================================================================

#[test]
fn json_report_with_colors_and_selection() {
    let dir = TempDir::new().unwrap();
    let batch = write(
        &dir,
        "batch.json",
        r##"{
            "tableId": "T",
            "mapping": {"Row": "R", "Column": "C", "Content": "V", "BackgroundColor": "Tone"},
            "records": [
                {"id": 1, "R": "a", "C": "x", "V": "1", "Tone": "Hot"},
                {"id": 2, "R": "a", "C": "y", "V": 2, "Tone": "navy"},
                {"id": 3, "R": "b", "C": "y", "V": "3", "Tone": "later"}
            ],
            "colors": {"Hot": {"fillColor": "#FF0000"}}
        }"##,
    );

    let out = stdout(&run(
        &dir,
        &["render", batch.to_str().unwrap(), "--format", "json", "--keys", "right,enter"],
    ));
    let json: serde_json::Value = serde_json::from_str(out.trim()).unwrap();

    assert_eq!(json["status"], "ready");
    assert_eq!(json["grid"]["rows"], serde_json::json!(["a", "b"]));
    assert_eq!(json["grid"]["columns"], serde_json::json!(["x", "y"]));
    assert_eq!(json["grid"]["columnAlignment"], serde_json::json!(["numeric", "numeric"]));
    assert_eq!(json["selected"], 2);
    assert_eq!(json["focus"], serde_json::json!({"row": 0, "col": 1, "item": 0}));

    assert_eq!(json["styles"]["Hot"], serde_json::json!({"fill": "#FF0000", "text": "#FFFFFF"}));
    assert_eq!(json["styles"]["navy"], serde_json::json!({"fill": "navy", "text": "#FFFFFF"}));
    assert!(json["styles"].get("later").is_none());
}

#[test]
fn json_report_lists_missing_slots() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "tasks.csv", TASKS_CSV);
    let out = stdout(&run(
        &dir,
        &["render", csv.to_str().unwrap(), "--csv", "--row", "Owner", "--format", "json"],
    ));
    let json: serde_json::Value = serde_json::from_str(out.trim()).unwrap();

    assert_eq!(json["status"], "mappingIncomplete");
    assert_eq!(json["missing"], serde_json::json!(["Column", "Content"]));
    assert!(json.get("grid").is_none());
    assert!(json["message"].as_str().unwrap().starts_with("Please configure"));
}

#[test]
fn manifest_lists_column_slots() {
    let dir = TempDir::new().unwrap();
    let out = stdout(&run(&dir, &["manifest"]));
    let json: serde_json::Value = serde_json::from_str(out.trim()).unwrap();

    assert_eq!(json["requiredAccess"], "read table");
    let names: Vec<&str> = json["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Row", "Column", "Content", "RowOrder", "ColumnOrder", "BackgroundColor"]);
}

// ===========================================================================
// Exit codes
// ===========================================================================

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");
    let output = run(&dir, &["render", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.json"));
}

#[test]
fn malformed_json_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let bad = write(&dir, "bad.json", "{ records: ");
    let output = run(&dir, &["render", bad.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn unknown_key_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = render_csv(&dir, &["--keys", "down,jump"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown key 'jump'"));
    assert!(stderr.contains("hint:"));
}
