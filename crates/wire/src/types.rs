// SPDX-License-Identifier: MIT

//! Summary/detail view types shared between [`crate::Request`] and
//! [`crate::Response`] — small serializable snapshots of core state, not
//! the core types themselves (the daemon never hands a live `Arc` over the
//! wire).

use cadence_core::{JobStatus, WorkspaceStatus};
use serde::{Deserialize, Serialize};

/// One row of `cadence workspace list` / `cadence status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceSummary {
    pub name: String,
    pub enabled: bool,
    pub status: WorkspaceStatus,
    pub current_mode: Option<String>,
    pub last_deployed: Option<u64>,
    pub last_destroyed: Option<u64>,
}

/// One row of `cadence job list` / `cadence status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobSummary {
    pub workspace: String,
    pub name: String,
    pub status: JobStatus,
    pub last_run: Option<u64>,
    pub last_exit_code: Option<i32>,
    pub run_count: u64,
}
