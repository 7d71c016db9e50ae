// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const PS_SAMPLE: &str = "\
  PID ARGS
    1 /sbin/init
  412 /usr/local/bin/billing-worker --queue high
  413 /usr/local/bin/billing-worker --queue low
  900 ps -A -o pid,args
";

#[test]
fn parse_keeps_matching_command_lines() {
    assert_eq!(parse_ps_output(PS_SAMPLE, "billing-worker"), vec![412, 413]);
}

#[test]
fn parse_skips_header_and_garbage() {
    assert!(parse_ps_output("  PID ARGS\nnot-a-pid foo\n", "foo").is_empty());
}

#[tokio::test]
async fn current_process_is_alive() {
    let probe = PsProbe::new("unused");
    assert!(probe.is_alive(std::process::id()).await);
}

#[tokio::test]
async fn pid_beyond_pid_max_is_not_alive() {
    let probe = PsProbe::new("unused");
    assert!(!probe.is_alive(4_194_305).await);
}

#[test]
fn default_pattern_is_the_executable_name() {
    let probe = PsProbe::for_current_exe();
    assert!(!probe.pattern().is_empty());
    assert!(!probe.pattern().contains('/'));
}
