// SPDX-License-Identifier: MIT

//! Responses the daemon sends back for a [`crate::Request`].

use crate::types::{JobSummary, WorkspaceSummary};
use serde::{Deserialize, Serialize};

/// A response from daemon to CLI over the IPC socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success with no payload.
    Ok,

    /// Handshake reply.
    Pong { version: String },

    /// The requested workspace/job does not exist in the current config.
    NotFound { name: String },

    /// The operation was rejected (e.g. workspace already busy, unknown mode).
    Rejected { reason: String },

    /// An unrecoverable error while handling the request.
    Error { message: String },

    /// `cadence status` / `cadence workspace list`.
    Workspaces { workspaces: Vec<WorkspaceSummary> },

    /// `cadence job list`.
    Jobs { jobs: Vec<JobSummary> },

    /// `cadence logs <workspace>` contents.
    Logs { content: String },

    /// Ack of a shutdown request; the daemon closes the socket right after.
    ShuttingDown,
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
