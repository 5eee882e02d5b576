// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from reading or writing a state document.
///
/// Per spec.md §7, state-store I/O errors are logged and the core continues
/// running in memory — they are surfaced here so callers can log them, not
/// so the daemon can abort on them.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("io error on state document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt state document {path}, falling back to empty: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
