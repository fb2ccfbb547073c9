//! Integration tests for the blocktime command line

mod utils;

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use utils::{bundle_json, navigation_trace, TraceBuilder};

fn write_bundle(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_observed_navigation_text_output() {
    let dir = TempDir::new().unwrap();
    let input = write_bundle(
        &dir,
        "run.json",
        &bundle_json("navigation", "devtools", &navigation_trace()),
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("blocktime");
    cmd.arg(&input);

    cmd.assert().success().stdout(predicate::str::contains(
        "Total Blocking Time (observed, navigation): 110 ms",
    ));
}

#[test]
fn test_auto_mode_picks_simulated_for_simulate_throttling() {
    let dir = TempDir::new().unwrap();
    let input = write_bundle(
        &dir,
        "run.json",
        &bundle_json("navigation", "simulate", &navigation_trace()),
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("blocktime");
    cmd.arg(&input);

    cmd.assert().success().stdout(predicate::str::contains(
        "Total Blocking Time (simulated, navigation): 740 ms",
    ));
}

#[test]
fn test_explicit_mode_overrides_settings() {
    let dir = TempDir::new().unwrap();
    let input = write_bundle(
        &dir,
        "run.json",
        &bundle_json("navigation", "simulate", &navigation_trace()),
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("blocktime");
    cmd.arg("--mode").arg("observed").arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("(observed, navigation): 110 ms"));
}

#[test]
fn test_json_output_parses() {
    let dir = TempDir::new().unwrap();
    let trace = TraceBuilder::new().task(0.0, 120.0).task(400.0, 30.0);
    let input = write_bundle(&dir, "run.json", &bundle_json("timespan", "devtools", &trace));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("blocktime");
    cmd.arg("--format").arg("json").arg(&input);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["metric"], "total-blocking-time");
    assert_eq!(parsed["mode"], "observed");
    assert_eq!(parsed["gather_mode"], "timespan");
    assert_eq!(parsed["timing_ms"], 70.0);
    assert!(parsed.get("cache").is_none());
}

#[test]
fn test_debug_includes_cache_stats() {
    let dir = TempDir::new().unwrap();
    let input = write_bundle(
        &dir,
        "run.json",
        &bundle_json("navigation", "devtools", &navigation_trace()),
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("blocktime");
    cmd.arg("--debug").arg("--format").arg("json").arg(&input);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["cache"]["metric_computations"], 2);
    assert_eq!(parsed["cache"]["trace_computations"], 1);
}

#[test]
fn test_config_changes_cpu_slowdown() {
    let dir = TempDir::new().unwrap();
    let input = write_bundle(
        &dir,
        "run.json",
        &bundle_json("navigation", "simulate", &navigation_trace()),
    );
    let config = write_bundle(
        &dir,
        "blocktime.toml",
        "[simulation]\ncpu_slowdown_multiplier = 1.0\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("blocktime");
    cmd.arg("--config").arg(&config).arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("(simulated, navigation): 110 ms"));
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write_bundle(
        &dir,
        "run.json",
        &bundle_json("navigation", "devtools", &navigation_trace()),
    );
    let config = write_bundle(
        &dir,
        "blocktime.toml",
        "[interactive]\nquiet_window_ms = -1.0\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("blocktime");
    cmd.arg("--config").arg(&config).arg(&input);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("blocktime");
    cmd.arg(dir.path().join("missing.json"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_bundle_without_trace_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_bundle(
        &dir,
        "run.json",
        r#"{ "gather_context": { "gather_mode": "timespan" } }"#,
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("blocktime");
    cmd.arg("--mode").arg("observed").arg(&input);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Required artifact missing: trace"));
}
