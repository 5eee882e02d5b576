// SPDX-License-Identifier: MIT

//! Runs a single job execution (script/command/template body) to
//! completion under a deadline, per spec.md §4.3's "Job execution
//! semantics by type".

use crate::error::JobError;
use cadence_config::{JobBody, JobConfig};
use cadence_iac::IacDriver;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Grace period between a SIGTERM and a forceful SIGKILL when a job
/// exceeds its timeout (spec.md §5: "send graceful termination, then
/// forceful kill after a brief grace interval").
const KILL_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Tail of combined stdout+stderr kept for `cadence logs`, truncated so a
/// runaway job can't blow up the job-state document.
const OUTPUT_TAIL_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub output_tail: String,
}

impl ExecutionOutcome {
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Build the environment for a job execution: declared `environment`
/// entries plus the fixed variables spec.md §4.3 requires every job type
/// to receive. The daemon's own environment is inherited by
/// `tokio::process::Command` automatically; this map is only the
/// additions/overrides.
pub fn build_env(workspace_id: &str, job: &JobConfig, deployment_dir: &Path) -> HashMap<String, String> {
    let mut env = job.environment.clone();
    env.insert("WORKSPACE_ID".to_string(), workspace_id.to_string());
    env.insert("JOB_NAME".to_string(), job.name.clone());
    env.insert("WORKSPACE_DEPLOYMENT_DIR".to_string(), deployment_dir.display().to_string());
    env
}

/// Run a job's script/command/template body.
pub async fn run_job(job: &JobConfig, working_dir: &Path, env: &HashMap<String, String>, iac: &dyn IacDriver, job_subdir_root: &Path) -> Result<ExecutionOutcome, JobError> {
    match &job.body {
        JobBody::Script(body) => run_script(&job.name, body, working_dir, env, job.timeout).await,
        JobBody::Command(line) => run_command(&job.name, line, working_dir, env, job.timeout).await,
        JobBody::Template(name) => run_template(&job.name, name, job_subdir_root, iac).await,
    }
}

async fn run_script(job_name: &str, body: &str, dir: &Path, env: &HashMap<String, String>, timeout: Duration) -> Result<ExecutionOutcome, JobError> {
    let mut file = tempfile::NamedTempFile::new().map_err(|source| JobError::ScriptSetup { job: job_name.to_string(), source })?;
    file.write_all(body.as_bytes()).map_err(|source| JobError::ScriptSetup { job: job_name.to_string(), source })?;
    file.flush().map_err(|source| JobError::ScriptSetup { job: job_name.to_string(), source })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.as_file().metadata().map_err(|source| JobError::ScriptSetup { job: job_name.to_string(), source })?.permissions();
        perms.set_mode(0o700);
        file.as_file().set_permissions(perms).map_err(|source| JobError::ScriptSetup { job: job_name.to_string(), source })?;
    }

    let path = file.into_temp_path();
    let mut cmd = Command::new("sh");
    cmd.arg(path.to_path_buf());
    let outcome = spawn_with_deadline(cmd, dir, env, timeout).await;
    // `path` (a TempPath) deletes the file on drop, after the process has exited.
    drop(path);
    outcome
}

async fn run_command(job_name: &str, command_line: &str, dir: &Path, env: &HashMap<String, String>, timeout: Duration) -> Result<ExecutionOutcome, JobError> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next().ok_or_else(|| JobError::EmptyCommand(job_name.to_string()))?;
    let mut cmd = Command::new(program);
    cmd.args(parts);
    spawn_with_deadline(cmd, dir, env, timeout).await
}

async fn run_template(job_name: &str, template_name: &str, job_subdir_root: &Path, iac: &dyn IacDriver) -> Result<ExecutionOutcome, JobError> {
    let job_dir = job_subdir_root.join(job_name);
    let map_err = |source| JobError::Template { job: job_name.to_string(), source };

    iac.init(&job_dir).await.map_err(map_err)?;
    iac.plan(&job_dir).await.map_err(map_err)?;
    iac.apply(&job_dir).await.map_err(map_err)?;
    let _ = template_name; // the per-job subdir is pre-populated by the caller from the named template

    Ok(ExecutionOutcome { exit_code: Some(0), timed_out: false, output_tail: String::new() })
}

async fn spawn_with_deadline(mut cmd: Command, dir: &Path, env: &HashMap<String, String>, timeout: Duration) -> Result<ExecutionOutcome, JobError> {
    cmd.current_dir(dir).envs(env).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(JobError::Spawn)?;
    let pid = child.id();

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(s) = stdout.as_mut() {
            let _ = s.read_to_end(&mut buf).await;
        }
        buf
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(s) = stderr.as_mut() {
            let _ = s.read_to_end(&mut buf).await;
        }
        buf
    });

    let (exit_code, timed_out) = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => (status.code(), false),
        Ok(Err(_)) => (None, false),
        Err(_) => {
            if let Some(pid) = pid {
                let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
            }
            match tokio::time::timeout(KILL_GRACE_PERIOD, child.wait()).await {
                Ok(Ok(status)) => (status.code(), true),
                _ => {
                    let _ = child.start_kill();
                    let status = child.wait().await.ok();
                    (status.and_then(|s| s.code()), true)
                }
            }
        }
    };

    let stdout_buf = stdout_task.await.unwrap_or_default();
    let stderr_buf = stderr_task.await.unwrap_or_default();
    let mut combined = String::from_utf8_lossy(&stdout_buf).into_owned();
    combined.push_str(&String::from_utf8_lossy(&stderr_buf));
    if combined.len() > OUTPUT_TAIL_BYTES {
        let mut start = combined.len() - OUTPUT_TAIL_BYTES;
        while start < combined.len() && !combined.is_char_boundary(start) {
            start += 1;
        }
        combined = combined[start..].to_string();
    }

    Ok(ExecutionOutcome { exit_code, timed_out, output_tail: combined })
}

pub fn job_subdir(working_dir_root: &Path, job_name: &str) -> PathBuf {
    working_dir_root.join("jobs").join(job_name)
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
