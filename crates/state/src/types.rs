// SPDX-License-Identifier: MIT

//! Per-entity records persisted by the state store, mirroring spec.md §3's
//! `WorkspaceState` and `JobState`.

use cadence_core::{JobStatus, WorkspaceStatus};
use serde::{Deserialize, Serialize};

/// Durable scheduling state for one workspace.
///
/// Created lazily on first reference and never deleted by the daemon itself
/// (spec.md §3: "retained across config removal so history is preserved;
/// CLI may prune").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub status: WorkspaceStatus,
    pub last_deployed: Option<u64>,
    pub last_destroyed: Option<u64>,
    #[serde(default)]
    pub last_deploy_error: Option<String>,
    #[serde(default)]
    pub last_destroy_error: Option<String>,
    /// Mode this workspace is currently deployed in, for mode-scheduled
    /// workspaces. `None` if fixed-schedule or never deployed.
    #[serde(default)]
    pub current_mode: Option<String>,
}

impl WorkspaceRecord {
    pub fn record_deploy_success(&mut self, at_epoch_ms: u64, mode: Option<String>) {
        self.status = WorkspaceStatus::Deployed { mode: mode.clone() };
        self.last_deployed = Some(at_epoch_ms);
        self.last_deploy_error = None;
        if let Some(mode) = mode {
            self.current_mode = Some(mode);
        }
    }

    pub fn record_deploy_failure(&mut self, reason: String) {
        self.status = WorkspaceStatus::DeployFailed { reason: reason.clone() };
        self.last_deploy_error = Some(reason);
    }

    pub fn record_destroy_success(&mut self, at_epoch_ms: u64) {
        self.status = WorkspaceStatus::Destroyed;
        self.last_destroyed = Some(at_epoch_ms);
        self.last_destroy_error = None;
        self.current_mode = None;
    }

    pub fn record_destroy_failure(&mut self, reason: String) {
        self.status = WorkspaceStatus::DestroyFailed { reason: reason.clone() };
        self.last_destroy_error = Some(reason);
    }
}

/// Durable execution state for one job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub status: JobStatus,
    pub last_run: Option<u64>,
    pub last_success: Option<u64>,
    pub last_failure: Option<u64>,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub last_exit_code: Option<i32>,
    #[serde(default)]
    pub run_count: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failure_count: u64,
    #[serde(default)]
    pub timeout_count: u64,
    /// Epoch ms this job's config was last (re)loaded with a different
    /// body/schedule/deps, used to reset a terminal `failed`/`timeout` job
    /// back to `pending` (spec.md §4.3 runnability predicate).
    #[serde(default)]
    pub last_config_modified: Option<u64>,
    #[serde(default)]
    pub next_run: Option<u64>,
}

impl JobRecord {
    pub fn start(&mut self, at_epoch_ms: u64) {
        self.status = JobStatus::Running;
        self.last_run = Some(at_epoch_ms);
        self.run_count += 1;
    }

    pub fn record_success(&mut self, at_epoch_ms: u64, exit_code: i32) {
        self.status = JobStatus::Success;
        self.last_success = Some(at_epoch_ms);
        self.last_exit_code = Some(exit_code);
        self.last_error = None;
        self.success_count += 1;
    }

    pub fn record_failure(&mut self, at_epoch_ms: u64, exit_code: Option<i32>, error: String) {
        self.status = JobStatus::Failed;
        self.last_failure = Some(at_epoch_ms);
        self.last_exit_code = exit_code;
        self.last_error = Some(error);
        self.failure_count += 1;
    }

    pub fn record_timeout(&mut self, at_epoch_ms: u64) {
        self.status = JobStatus::Timeout;
        self.last_failure = Some(at_epoch_ms);
        self.last_error = Some("execution exceeded its timeout".to_string());
        self.timeout_count += 1;
    }
}

/// Compound key identifying a job in the job-state document:
/// `"<workspace>:<job>"`, or `"_standalone_:<job>"` for standalone jobs.
pub fn job_key(workspace: &str, job: &str) -> String {
    format!("{workspace}:{job}")
}
