// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cadence-state: the durable state store — two atomically-persisted JSON
//! documents (one for workspace/scheduler state, one for job state) and the
//! typed records they hold.

mod error;
mod store;
mod types;

pub use error::StateError;
pub use types::{job_key, JobRecord, WorkspaceRecord};

use cadence_core::WorkspaceStatus;
use std::collections::BTreeMap;
use std::path::Path;
use store::DocumentStore;

/// Durable workspace scheduling state: `<state_root>/scheduler.json`.
pub struct SchedulerStore {
    doc: DocumentStore<WorkspaceRecord>,
}

impl SchedulerStore {
    pub fn open(state_root: &Path) -> Self {
        Self { doc: DocumentStore::open(state_root.join("scheduler.json")) }
    }

    pub fn get(&self, workspace: &str) -> WorkspaceRecord {
        self.doc.get(workspace).unwrap_or_default()
    }

    pub fn snapshot(&self) -> BTreeMap<String, WorkspaceRecord> {
        self.doc.snapshot()
    }

    pub fn set_status(&self, workspace: &str, status: WorkspaceStatus, at_epoch_ms: u64) -> Result<(), StateError> {
        self.doc.mutate(workspace, at_epoch_ms, WorkspaceRecord::default, |r| r.status = status)
    }

    pub fn record_deploy_success(&self, workspace: &str, at_epoch_ms: u64, mode: Option<String>) -> Result<(), StateError> {
        self.doc.mutate(workspace, at_epoch_ms, WorkspaceRecord::default, |r| r.record_deploy_success(at_epoch_ms, mode))
    }

    pub fn record_deploy_failure(&self, workspace: &str, at_epoch_ms: u64, reason: String) -> Result<(), StateError> {
        self.doc.mutate(workspace, at_epoch_ms, WorkspaceRecord::default, |r| r.record_deploy_failure(reason))
    }

    pub fn record_destroy_success(&self, workspace: &str, at_epoch_ms: u64) -> Result<(), StateError> {
        self.doc.mutate(workspace, at_epoch_ms, WorkspaceRecord::default, |r| r.record_destroy_success(at_epoch_ms))
    }

    pub fn record_destroy_failure(&self, workspace: &str, at_epoch_ms: u64, reason: String) -> Result<(), StateError> {
        self.doc.mutate(workspace, at_epoch_ms, WorkspaceRecord::default, |r| r.record_destroy_failure(reason))
    }

    /// Mark a workspace as mid-deploy, recording the target mode for
    /// mode-scheduled workspaces.
    pub fn begin_deploy(&self, workspace: &str, at_epoch_ms: u64, mode: Option<String>) -> Result<(), StateError> {
        self.doc
            .mutate(workspace, at_epoch_ms, WorkspaceRecord::default, |r| r.status = WorkspaceStatus::Deploying { mode })
    }

    pub fn begin_destroy(&self, workspace: &str, at_epoch_ms: u64) -> Result<(), StateError> {
        self.doc.mutate(workspace, at_epoch_ms, WorkspaceRecord::default, |r| r.status = WorkspaceStatus::Destroying)
    }
}

/// Durable job execution state: `<state_root>/jobs.json`, keyed by
/// `"<workspace>:<job>"` (see [`job_key`]).
pub struct JobStateStore {
    doc: DocumentStore<JobRecord>,
}

impl JobStateStore {
    pub fn open(state_root: &Path) -> Self {
        Self { doc: DocumentStore::open(state_root.join("jobs.json")) }
    }

    pub fn get(&self, workspace: &str, job: &str) -> JobRecord {
        self.doc.get(&job_key(workspace, job)).unwrap_or_default()
    }

    /// Snapshot every job record for one workspace: `(job_name, record)`.
    pub fn snapshot_workspace(&self, workspace: &str) -> Vec<(String, JobRecord)> {
        let prefix = format!("{workspace}:");
        self.doc
            .snapshot()
            .into_iter()
            .filter_map(|(k, v)| k.strip_prefix(&prefix).map(|job| (job.to_string(), v)))
            .collect()
    }

    pub fn start(&self, workspace: &str, job: &str, at_epoch_ms: u64) -> Result<(), StateError> {
        self.doc.mutate(&job_key(workspace, job), at_epoch_ms, JobRecord::default, |r| r.start(at_epoch_ms))
    }

    pub fn record_success(&self, workspace: &str, job: &str, at_epoch_ms: u64, exit_code: i32) -> Result<(), StateError> {
        self.doc
            .mutate(&job_key(workspace, job), at_epoch_ms, JobRecord::default, |r| r.record_success(at_epoch_ms, exit_code))
    }

    pub fn record_failure(&self, workspace: &str, job: &str, at_epoch_ms: u64, exit_code: Option<i32>, error: String) -> Result<(), StateError> {
        self.doc
            .mutate(&job_key(workspace, job), at_epoch_ms, JobRecord::default, |r| r.record_failure(at_epoch_ms, exit_code, error))
    }

    pub fn record_timeout(&self, workspace: &str, job: &str, at_epoch_ms: u64) -> Result<(), StateError> {
        self.doc.mutate(&job_key(workspace, job), at_epoch_ms, JobRecord::default, |r| r.record_timeout(at_epoch_ms))
    }

    /// Reset a terminal job back to `pending` after its config changed,
    /// per spec.md §4.3 ("become eligible again after a configuration
    /// modification").
    pub fn reset_for_config_change(&self, workspace: &str, job: &str, at_epoch_ms: u64) -> Result<(), StateError> {
        self.doc.mutate(&job_key(workspace, job), at_epoch_ms, JobRecord::default, |r| {
            r.status = cadence_core::JobStatus::Pending;
            r.last_config_modified = Some(at_epoch_ms);
        })
    }

    /// Remove job-state entries for jobs no longer present in the current
    /// config (spec.md §4.4 "Prune policy").
    pub fn cleanup_job_states(&self, workspace: &str, active_job_names: &[String], at_epoch_ms: u64) -> Result<(), StateError> {
        let prefix = format!("{workspace}:");
        self.doc.retain_keys(
            |k| match k.strip_prefix(&prefix) {
                Some(job) => active_job_names.iter().any(|n| n == job),
                None => true,
            },
            at_epoch_ms,
        )
    }
}
