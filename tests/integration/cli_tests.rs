//! Integration tests for the CLI binary.
//!
//! Verifies that the `ggate` binary responds to basic flags and that its
//! subcommands work against a preferences file in a temporary directory.
//!
//! This test is registered as a [[test]] in the geospatial-gate-cli crate
//! so that CARGO_BIN_EXE_ggate is available.

use std::path::Path;
use std::process::{Command, Output};

use geospatial_gate::history::encode_history;
use geospatial_gate::storage::ANCHOR_HISTORY_KEY;
use geospatial_gate::{
    AnchorHistoryCollection, AnchorKind, AnchorRecord, GeoCoordinates, KeyValueStore, PrefsFile,
    Quaternion,
};

/// Get a Command pointing to the `ggate` binary.
fn ggate_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ggate"))
}

fn run_with_store(store: &Path, args: &[&str]) -> Output {
    ggate_binary()
        .arg("--store")
        .arg(store)
        .args(args)
        .output()
        .expect("failed to execute ggate")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn cli_responds_to_help() {
    let output = ggate_binary()
        .arg("--help")
        .output()
        .expect("failed to execute ggate --help");

    assert!(
        output.status.success(),
        "ggate --help should exit with success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = stdout(&output);
    assert!(
        stdout.contains("ggate") || stdout.contains("Usage"),
        "ggate --help output should contain usage information, got: {stdout}"
    );
}

#[test]
fn cli_responds_to_version() {
    let output = ggate_binary()
        .arg("--version")
        .output()
        .expect("failed to execute ggate --version");

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "ggate --version should contain version info, got: {stdout}"
    );
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = ggate_binary()
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute ggate");

    assert!(
        !output.status.success(),
        "ggate with unknown flag should exit with error"
    );
}

#[test]
fn cli_gate_reports_localization() {
    let output = ggate_binary()
        .args(["gate", "--horizontal", "3", "--vertical", "2", "--yaw", "1"])
        .output()
        .expect("failed to execute ggate gate");
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("localized"));

    let output = ggate_binary()
        .args(["gate", "--horizontal", "5", "--vertical", "2", "--yaw", "1"])
        .output()
        .expect("failed to execute ggate gate");
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("not localized"));

    let output = ggate_binary()
        .args([
            "gate",
            "--horizontal",
            "1",
            "--vertical",
            "1",
            "--yaw",
            "1",
            "--not-tracking",
        ])
        .output()
        .expect("failed to execute ggate gate");
    assert!(stdout(&output).starts_with("not localized"));
}

#[test]
fn cli_privacy_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("prefs.json");

    let output = run_with_store(&store, &["privacy", "status"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("not yet accepted"));

    assert!(run_with_store(&store, &["privacy", "accept"]).status.success());
    let output = run_with_store(&store, &["privacy", "status"]);
    assert!(stdout(&output).contains("Privacy prompt: accepted"));

    assert!(run_with_store(&store, &["privacy", "reset"]).status.success());
    let output = run_with_store(&store, &["privacy", "status"]);
    assert!(stdout(&output).contains("not yet accepted"));
}

#[test]
fn cli_history_on_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("prefs.json");

    let output = run_with_store(&store, &["history", "list"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No anchors"));

    let output = run_with_store(&store, &["history", "list", "--json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed, serde_json::json!([]));

    let output = run_with_store(&store, &["history", "prune"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No anchor history stored"));

    let output = run_with_store(&store, &["history", "clear"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Cleared anchor history"));
}

#[test]
fn cli_simulate_json_summary() {
    let output = ggate_binary()
        .args(["simulate", "--ticks", "2000", "--json"])
        .output()
        .expect("failed to execute ggate simulate");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["lifecycle"], "Ready");
    assert_eq!(summary["bootstrap"], "Complete");
    assert_eq!(summary["availability_checks"], 1);
}

#[test]
fn cli_simulate_unsupported_device() {
    let output = ggate_binary()
        .args(["simulate", "--ticks", "2000", "--unsupported", "--json"])
        .output()
        .expect("failed to execute ggate simulate");
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["lifecycle"], "Error");
    assert!(summary["hard_failure"].is_string());
}

#[test]
fn cli_rejects_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = ggate_binary()
        .arg("--config")
        .arg(dir.path().join("missing.json"))
        .args(["gate", "--horizontal", "1", "--vertical", "1", "--yaw", "1"])
        .output()
        .expect("failed to execute ggate");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn cli_history_list_filters_by_kind() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("prefs.json");

    let now = geospatial_gate::time::local_now();
    let mut collection = AnchorHistoryCollection::new(20);
    for kind in [AnchorKind::Geospatial, AnchorKind::Terrain, AnchorKind::Terrain] {
        collection.push(AnchorRecord::new(
            kind,
            GeoCoordinates::new(48.85, 2.35, 35.0),
            Quaternion::IDENTITY,
            now,
        ));
    }
    let mut prefs = PrefsFile::open(&store).unwrap();
    prefs
        .set_string(ANCHOR_HISTORY_KEY, &encode_history(&collection).unwrap())
        .unwrap();
    prefs.flush().unwrap();

    let output = run_with_store(&store, &["history", "list", "--kind", "terrain", "--json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed.as_array().map(|a| a.len()), Some(2));

    let output = run_with_store(&store, &["history", "list", "--kind", "rooftop"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No anchors"));

    let output = run_with_store(&store, &["history", "list", "--kind", "cloud"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown anchor kind"));
}

#[test]
fn cli_verbose_flag_enables_debug_logging() {
    let output = ggate_binary()
        .env_remove("RUST_LOG")
        .args(["-v", "simulate", "--ticks", "50"])
        .output()
        .expect("failed to execute ggate simulate");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Bootstrap"),
        "debug logging should reach stderr with -v, got: {stderr}"
    );

    let output = ggate_binary()
        .env_remove("RUST_LOG")
        .args(["simulate", "--ticks", "50"])
        .output()
        .expect("failed to execute ggate simulate");
    assert!(!String::from_utf8_lossy(&output.stderr).contains("Bootstrap"));
}
