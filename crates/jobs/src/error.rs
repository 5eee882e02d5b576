// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to spawn job process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("job {0:?} has no command to execute (empty command string)")]
    EmptyCommand(String),

    #[error("failed to prepare script for job {job:?}: {source}")]
    ScriptSetup {
        job: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template job {job:?} failed: {source}")]
    Template {
        job: String,
        #[source]
        source: cadence_iac::IacError,
    },

    #[error("state store error for job {job:?}: {source}")]
    State {
        job: String,
        #[source]
        source: cadence_state::StateError,
    },
}
