// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from driving the external IaC subprocess (`tofu`/`terraform`).
///
/// Captured stdout/stderr is attached to `CommandFailed`/`Timeout` so the
/// caller can surface the tool's own diagnostics (spec.md §4.5: "Captured
/// output is attached to the error").
#[derive(Debug, Error)]
pub enum IacError {
    #[error("failed to spawn {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} exited with status {exit_code:?} in {dir}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    CommandFailed {
        step: &'static str,
        dir: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("{step} timed out after {timeout_secs}s in {dir}")]
    Timeout { step: &'static str, dir: String, timeout_secs: u64 },

    #[error("failed to sync template files into {dir}: {source}")]
    Sync {
        dir: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error preparing working directory {dir}: {source}")]
    Io {
        dir: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template {0:?} not found in registry")]
    TemplateNotFound(String),

    #[error("workspace {0:?} has no template and no local entry file to deploy")]
    NothingToDeploy(String),
}
