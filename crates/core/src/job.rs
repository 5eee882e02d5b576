// SPDX-License-Identifier: MIT

//! Job identifier, execution status, and the record of one run.

use crate::workspace::WorkspaceId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a configured job.
    pub struct JobId("job-");
}

crate::define_id! {
    /// Unique identifier for one run (execution) of a job.
    pub struct ExecutionId("exe-");
}

/// Status of a job's most recent (or in-progress) execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Never run, or waiting for its dependencies/trigger.
    #[default]
    Pending,
    /// Currently executing.
    Running,
    /// Most recent run exited 0.
    Success,
    /// Most recent run exited non-zero.
    Failed,
    /// Most recent run was killed for exceeding its timeout.
    Timeout,
    /// Job is disabled and will not be scheduled or fanned out to.
    Disabled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed | JobStatus::Timeout)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Success)
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Success => "success",
        Failed => "failed",
        Timeout => "timeout",
        Disabled => "disabled",
    }
}

/// One recorded run of a job: what triggered it, when it ran, and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobExecution {
    pub id: ExecutionId,
    pub job_id: JobId,
    pub workspace_id: WorkspaceId,
    /// What caused this run: a CRON tag or a lifecycle event name.
    pub trigger: String,
    pub started_epoch_ms: u64,
    pub finished_epoch_ms: Option<u64>,
    pub status: JobStatus,
    pub exit_code: Option<i32>,
    /// Truncated tail of combined stdout/stderr, kept for `cadence logs`.
    pub output_tail: String,
}

impl JobExecution {
    pub fn is_running(&self) -> bool {
        self.status == JobStatus::Running
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
