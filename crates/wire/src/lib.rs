// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cadence-wire: the length-prefixed JSON IPC protocol between the
//! `cadence` CLI and a running `cadenced` daemon (spec.md §6 "Management
//! CLIs invoke core operations").
//!
//! The state store is guarded by a single in-process mutex (spec.md §4.4),
//! so only the daemon process may ever mutate it; a CLI invocation of a
//! manual operation is a request sent over this protocol to the daemon's
//! listener, not a direct write to the state document.

mod request;
mod response;
mod types;
mod wire;

pub use request::Request;
pub use response::Response;
pub use types::{JobSummary, WorkspaceSummary};
pub use wire::{decode, encode, read_message, read_request, write_message, write_response, ProtocolError};
