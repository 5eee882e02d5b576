// SPDX-License-Identifier: MIT

//! Manual operations (spec.md §6): `cadence deploy`/`destroy`/`mode`
//! bypass schedule evaluation entirely, but go through the exact same
//! dispatch path as a scheduled firing — same busy check, same state
//! transitions, same lifecycle events — so a manual trigger is
//! indistinguishable from a scheduled one once it is in flight.

use cadence_config::ScheduleMode;
use cadence_core::clock::Clock;
use std::sync::Arc;
use thiserror::Error;

use crate::runtime::Runtime;

#[derive(Debug, Error)]
pub enum ManualError {
    #[error("workspace {0:?} is not configured")]
    UnknownWorkspace(String),
    #[error("workspace {0:?} has a fixed deploy/destroy schedule, not modes")]
    NotModal(String),
    #[error("workspace {workspace:?} has no mode named {mode:?}")]
    UnknownMode { workspace: String, mode: String },
    #[error("workspace {0:?} already has an operation in flight")]
    Busy(String),
}

/// `cadence deploy <workspace>` (fixed-schedule workspace) or `cadence
/// deploy <workspace> <mode>` (mode-scheduled workspace).
pub fn deploy<C: Clock>(runtime: &Arc<Runtime<C>>, workspace: &str, mode: Option<String>) -> Result<(), ManualError> {
    let ws = runtime.workspace(workspace).ok_or_else(|| ManualError::UnknownWorkspace(workspace.to_string()))?;

    if let Some(mode) = &mode {
        match &ws.schedule {
            ScheduleMode::Modes(modes) if !modes.contains_key(mode) => {
                return Err(ManualError::UnknownMode { workspace: workspace.to_string(), mode: mode.clone() })
            }
            ScheduleMode::Fixed { .. } => return Err(ManualError::NotModal(workspace.to_string())),
            _ => {}
        }
    }

    if runtime.scheduler_store.get(workspace).status.is_busy() {
        return Err(ManualError::Busy(workspace.to_string()));
    }

    let now = runtime.clock().epoch_ms();
    runtime.dispatch_deploy(ws, mode, now);
    Ok(())
}

/// `cadence destroy <workspace>`.
pub fn destroy<C: Clock>(runtime: &Arc<Runtime<C>>, workspace: &str) -> Result<(), ManualError> {
    let ws = runtime.workspace(workspace).ok_or_else(|| ManualError::UnknownWorkspace(workspace.to_string()))?;
    if runtime.scheduler_store.get(workspace).status.is_busy() {
        return Err(ManualError::Busy(workspace.to_string()));
    }
    let now = runtime.clock().epoch_ms();
    runtime.dispatch_destroy(ws, now);
    Ok(())
}

/// `cadence mode <workspace> <mode>`: an explicit mode switch, equivalent
/// to a deploy dispatched in that mode (spec.md §4.2 "A manual mode change
/// is a deploy dispatched with the requested mode").
pub fn set_mode<C: Clock>(runtime: &Arc<Runtime<C>>, workspace: &str, mode: &str) -> Result<(), ManualError> {
    deploy(runtime, workspace, Some(mode.to_string()))
}

#[cfg(test)]
#[path = "manual_tests.rs"]
mod tests;
