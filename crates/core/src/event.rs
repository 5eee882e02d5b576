// SPDX-License-Identifier: MIT

//! Lifecycle events that can trigger event-gated jobs, as an alternative
//! to CRON-driven scheduling.

use crate::workspace::WorkspaceId;
use serde::{Deserialize, Serialize};

/// A lifecycle event emitted by the scheduler loop as workspaces transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentEvent {
    pub kind: EventKind,
    pub workspace_id: WorkspaceId,
    pub epoch_ms: u64,
    /// Mode the workspace deployed into, when `kind` is `Deployment`/`DeploymentFailed`.
    pub mode: Option<String>,
    /// Failure reason, when `kind` is `DeploymentFailed`/`DestroyFailed`.
    pub error: Option<String>,
}

/// Event tags a job's `on` trigger list can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A deploy completed successfully.
    Deployment,
    /// A deploy attempt failed.
    DeploymentFailed,
    /// A destroy completed successfully.
    Destroy,
    /// A destroy attempt failed.
    DestroyFailed,
    /// The daemon process started (cold start only, not a hot config reload).
    Reboot,
}

impl EventKind {
    /// The `@`-prefixed tag used in job `on:` lists, e.g. `@deployment`.
    pub fn tag(&self) -> &'static str {
        match self {
            EventKind::Deployment => "@deployment",
            EventKind::DeploymentFailed => "@deployment-failed",
            EventKind::Destroy => "@destroy",
            EventKind::DestroyFailed => "@destroy-failed",
            EventKind::Reboot => "@reboot",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "@deployment" => Some(EventKind::Deployment),
            "@deployment-failed" => Some(EventKind::DeploymentFailed),
            "@destroy" => Some(EventKind::Destroy),
            "@destroy-failed" => Some(EventKind::DestroyFailed),
            "@reboot" => Some(EventKind::Reboot),
            _ => None,
        }
    }
}

impl DeploymentEvent {
    /// Does a job's `on:` trigger list include this event's tag?
    pub fn matches_schedule(&self, on_triggers: &[String]) -> bool {
        on_triggers.iter().any(|t| t == self.kind.tag())
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
