// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ps`-based process probe

use super::{ProbeError, ProcessProbe};
use crate::subprocess::{run_with_timeout, HOSTNAME_TIMEOUT, KILL_PROBE_TIMEOUT};
use async_trait::async_trait;
use tokio::process::Command;

/// Probe that shells out to `hostname`, `ps` and `kill -0`.
///
/// Worker processes are recognized by `pattern` appearing in their command
/// line; by default that is the file name of the running executable.
#[derive(Clone, Debug)]
pub struct PsProbe {
    pattern: String,
}

impl PsProbe {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Match processes running the same executable as this one
    pub fn for_current_exe() -> Self {
        let pattern = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "resque".to_string());
        Self::new(pattern)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Parse `ps -A -o pid,args` output, keeping pids whose command line
/// contains `pattern`.
pub(crate) fn parse_ps_output(output: &str, pattern: &str) -> Vec<u32> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let (pid, args) = line.split_once(char::is_whitespace)?;
            let pid = pid.parse::<u32>().ok()?;
            args.contains(pattern).then_some(pid)
        })
        .collect()
}

#[async_trait]
impl ProcessProbe for PsProbe {
    async fn hostname(&self) -> Result<String, ProbeError> {
        let cmd = Command::new("hostname");
        match run_with_timeout(cmd, HOSTNAME_TIMEOUT, "hostname").await {
            Ok(output) if output.status.success() => {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if name.is_empty() {
                    Err(ProbeError::BadOutput("empty hostname".to_string()))
                } else {
                    Ok(name)
                }
            }
            Ok(output) => Err(ProbeError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )),
            Err(e) => std::env::var("HOSTNAME").map_err(|_| ProbeError::CommandFailed(e)),
        }
    }

    async fn worker_pids(&self) -> Result<Vec<u32>, ProbeError> {
        let mut cmd = Command::new("ps");
        cmd.args(["-A", "-o", "pid,args"]);
        let output = run_with_timeout(cmd, crate::env::ps_timeout(), "ps")
            .await
            .map_err(ProbeError::CommandFailed)?;
        if !output.status.success() {
            return Err(ProbeError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_ps_output(&stdout, &self.pattern))
    }

    async fn is_alive(&self, pid: u32) -> bool {
        let proc_root = std::path::Path::new("/proc");
        if proc_root.join("self").exists() {
            return proc_root.join(pid.to_string()).exists();
        }
        let mut cmd = Command::new("kill");
        cmd.args(["-0", &pid.to_string()]);
        run_with_timeout(cmd, KILL_PROBE_TIMEOUT, "kill -0")
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "ps_tests.rs"]
mod tests;
