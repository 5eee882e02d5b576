// SPDX-License-Identifier: MIT

//! Requests the `cadence` CLI sends to a running `cadenced` daemon
//! (spec.md §6 "Management CLIs invoke core operations").

use serde::{Deserialize, Serialize};

/// A request from CLI to daemon over the IPC socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Request {
    /// Version/liveness handshake.
    Ping,

    /// `cadence deploy <workspace> [mode]`
    ManualDeploy { workspace: String, mode: Option<String> },

    /// `cadence destroy <workspace>`
    ManualDestroy { workspace: String },

    /// `cadence mode <workspace> <mode>`
    ManualMode { workspace: String, mode: String },

    /// `cadence status` (workspace = None) or `cadence status <workspace>`
    Status { workspace: Option<String> },

    /// `cadence job list [workspace]`
    ListJobs { workspace: Option<String> },

    /// `cadence logs <workspace>`
    Logs { workspace: String, lines: usize },

    /// Ask the daemon to shut down gracefully (used by the `cadenced`
    /// control path, not a documented CLI subcommand).
    Shutdown,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
