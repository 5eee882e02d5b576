// SPDX-License-Identifier: MIT

//! Runs one shell command line to completion under a deadline, capturing
//! combined output for error reporting.

use crate::error::IacError;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default deadline for a workspace deploy/destroy step when the caller
/// doesn't override it — spec.md §5 ("workspace ops use the host's
/// default").
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Run `command_line` via `sh -c` in `dir`, with `env` merged over the
/// daemon's own environment, under `timeout`.
///
/// On timeout, sends a kill to the child (tokio's `Command::kill` is a
/// SIGKILL-equivalent hard stop; see `cadence-jobs::exec` for the
/// terminate-then-kill grace period used for job processes, which this
/// short-lived helper does not need since IaC steps are not expected to
/// trap signals).
pub async fn run_step(step: &'static str, dir: &Path, command_line: &str, env: &HashMap<String, String>, timeout: Duration) -> Result<(), IacError> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command_line)
        .current_dir(dir)
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| IacError::Spawn { command: command_line.to_string(), source })?;

    let outcome = tokio::time::timeout(timeout, child.wait_with_output()).await;

    let output = match outcome {
        Ok(result) => result.map_err(|source| IacError::Spawn { command: command_line.to_string(), source })?,
        Err(_) => {
            return Err(IacError::Timeout { step, dir: dir.display().to_string(), timeout_secs: timeout.as_secs() });
        }
    };

    if output.status.success() {
        return Ok(());
    }

    Err(IacError::CommandFailed {
        step,
        dir: dir.display().to_string(),
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
