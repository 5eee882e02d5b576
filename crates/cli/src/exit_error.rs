// SPDX-License-Identifier: MIT

//! Error type that carries a process exit code (spec.md §6: "0 on
//! success, 1 on runtime error, 2 on argument error").
//!
//! Command handlers return `ExitError` instead of calling
//! `std::process::exit()` directly, letting `main()` own process
//! termination.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Runtime error: the operation was attempted but failed (daemon
    /// unreachable, workspace busy, IaC failure already recorded).
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }

    /// Argument/usage error: the request itself was invalid (unknown
    /// workspace, malformed schedule, bad CLI argument).
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<cadence_wire::ProtocolError> for ExitError {
    fn from(e: cadence_wire::ProtocolError) -> Self {
        ExitError::runtime(format!("daemon connection error: {e}"))
    }
}

impl From<std::io::Error> for ExitError {
    fn from(e: std::io::Error) -> Self {
        ExitError::runtime(format!("daemon not reachable: {e}"))
    }
}
