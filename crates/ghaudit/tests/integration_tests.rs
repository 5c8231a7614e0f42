// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

// Tests of expected behaviour when CLI args are incorrect/missing. Nothing
// here talks to the network.

use std::process::Command;

use assert_cmd::prelude::CommandCargoExt;

fn ghaudit() -> Command {
    let mut command = Command::cargo_bin("ghaudit").unwrap();
    // Don't let ambient configuration leak into argument-parsing tests.
    command.env_remove("GHAUDIT_TOKEN");
    command.env_remove("GHAUDIT_ORG");
    command.env_remove("GHAUDIT_API_ROOT");
    command.env_remove("GHAUDIT_MIN_APPROVERS");
    command
}

#[test]
fn error_when_no_args_given() {
    let output = ghaudit().output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--token"));
    assert!(stderr.contains("--org"));
}

#[test]
fn error_when_token_is_missing() {
    let output = ghaudit().args(["--org", "acme"]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("required"));
    assert!(stderr.contains("--token"));
}

#[test]
fn help_documents_env_vars_and_default_output() {
    let output = ghaudit().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("GHAUDIT_TOKEN"));
    assert!(stdout.contains("GHAUDIT_ORG"));
    assert!(stdout.contains("github_audit.csv"));
}

#[test]
fn unusable_api_root_is_a_configuration_error() {
    let output = ghaudit()
        .args(["-t", "x", "-o", "acme", "--api-root", "not a url"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid API root"));
}

#[test]
fn version_flag_works() {
    let output = ghaudit().arg("--version").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("ghaudit"));
}
