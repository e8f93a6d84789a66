// SPDX-License-Identifier: GPL-3.0-only

//! Tests for the depthview binary

use std::process::Command;

fn depthview(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_depthview"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_startup_error_is_reported_once() {
    let output = depthview(&["--source", "synthetic", "--headless", "--near", "1500", "--far", "500"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    assert_eq!(lines.len(), 1, "Unexpected stderr: {}", stderr);
    assert!(lines[0].starts_with("depthview: "));
    assert!(lines[0].contains("1500"));
}

#[test]
fn test_headless_run_with_frame_limit() {
    let output = depthview(&["--source", "synthetic", "--headless", "--max-frames", "2"]);
    assert!(output.status.success());
    assert!(output.stderr.is_empty());
}

#[test]
fn test_list_json_includes_synthetic_source() {
    let output = depthview(&["list", "--json"]);
    assert!(output.status.success());

    let devices: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let devices = devices.as_array().unwrap();
    let last = devices.last().unwrap();
    assert_eq!(last["source"], "synthetic");
    assert_eq!(last["index"], devices.len() - 1);
}

#[test]
fn test_version_flag_reports_build_version() {
    let output = depthview(&["--version"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(depthview::constants::app_info::version()));
}
