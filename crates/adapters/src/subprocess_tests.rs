// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::process::Command;

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[tokio::test]
async fn hostname_lookup_finishes_within_its_timeout() {
    let output = run_with_timeout(Command::new("hostname"), HOSTNAME_TIMEOUT, "hostname")
        .await
        .unwrap();

    assert!(output.status.success());
    assert!(!stdout(&output).is_empty());
}

#[yare::parameterized(
    own_pid    = { std::process::id(), true },
    unused_pid = { 4_194_303, false },
)]
#[test_macro(tokio::test)]
async fn kill_zero_reports_liveness_through_exit_status(pid: u32, alive: bool) {
    let mut cmd = Command::new("kill");
    cmd.args(["-0", &pid.to_string()]);
    let output = run_with_timeout(cmd, KILL_PROBE_TIMEOUT, "kill -0").await.unwrap();

    assert_eq!(output.status.success(), alive);
}

#[tokio::test]
async fn ps_listing_includes_this_process() {
    let mut cmd = Command::new("ps");
    cmd.args(["-A", "-o", "pid,args"]);
    let output = run_with_timeout(cmd, PS_TIMEOUT, "ps").await.unwrap();

    let own = std::process::id().to_string();
    assert!(stdout(&output)
        .lines()
        .any(|line| line.split_whitespace().next() == Some(own.as_str())));
}

#[tokio::test]
async fn failed_exit_is_returned_not_raised() {
    let output = run_with_timeout(Command::new("false"), PS_TIMEOUT, "false")
        .await
        .unwrap();
    assert!(!output.status.success());
}

#[tokio::test]
async fn missing_program_names_the_description() {
    let err = run_with_timeout(Command::new("/nonexistent/qw-ps"), PS_TIMEOUT, "ps")
        .await
        .unwrap_err();
    assert!(err.starts_with("ps failed:"), "got: {err}");
}

#[tokio::test]
async fn slow_command_is_cut_off() {
    let mut cmd = Command::new("sleep");
    cmd.arg("10");
    let err = run_with_timeout(cmd, Duration::from_millis(100), "hostname")
        .await
        .unwrap_err();
    assert_eq!(err, "hostname timed out after 100ms");
}
