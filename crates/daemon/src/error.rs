// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Daemon startup/shutdown errors (spec.md §7.1).
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("another cadenced instance is already running (lock held at {0})")]
    AlreadyRunning(String),

    #[error("failed to bind control socket at {path}: {source}")]
    BindFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error preparing state directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
