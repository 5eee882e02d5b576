// SPDX-License-Identifier: MIT

//! Workspace identifier and deploy/destroy lifecycle status.
//!
//! A workspace is a named, independently-scheduled unit of infrastructure:
//! one OpenTofu/Terraform root module plus the CRON schedules that govern
//! when it is deployed and destroyed.

use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Unique identifier for a workspace.
    pub struct WorkspaceId("wks-");
}

/// Lifecycle status of a workspace.
///
/// Transitions: `Destroyed -> Deploying -> Deployed -> Destroying -> Destroyed`,
/// with `Deploying`/`Destroying` able to land on the matching `*Failed` state
/// instead of completing. A failed workspace stays put until the next manual
/// or scheduled operation retries it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkspaceStatus {
    /// No infrastructure is provisioned.
    #[default]
    Destroyed,
    /// `tofu apply` (or equivalent) is running.
    Deploying {
        /// Mode schedule tag driving this deploy, if any (see mode_schedules).
        mode: Option<String>,
    },
    /// Infrastructure is provisioned and up to date.
    Deployed {
        /// Mode this workspace was deployed in, if mode_schedules are configured.
        mode: Option<String>,
    },
    /// `tofu destroy` (or equivalent) is running.
    Destroying,
    /// The most recent deploy attempt failed. Infrastructure may be partially applied.
    DeployFailed {
        reason: String,
    },
    /// The most recent destroy attempt failed. Infrastructure may be partially destroyed.
    DestroyFailed {
        reason: String,
    },
}

impl WorkspaceStatus {
    /// Is a deploy or destroy operation currently in flight for this workspace?
    pub fn is_busy(&self) -> bool {
        matches!(self, WorkspaceStatus::Deploying { .. } | WorkspaceStatus::Destroying)
    }

    /// Is the workspace currently provisioned (deployed, in any mode)?
    pub fn is_deployed(&self) -> bool {
        matches!(self, WorkspaceStatus::Deployed { .. })
    }

    pub fn mode(&self) -> Option<&str> {
        match self {
            WorkspaceStatus::Deploying { mode } | WorkspaceStatus::Deployed { mode } => mode.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceStatus::Destroyed => write!(f, "destroyed"),
            WorkspaceStatus::Deploying { mode: None } => write!(f, "deploying"),
            WorkspaceStatus::Deploying { mode: Some(m) } => write!(f, "deploying({m})"),
            WorkspaceStatus::Deployed { mode: None } => write!(f, "deployed"),
            WorkspaceStatus::Deployed { mode: Some(m) } => write!(f, "deployed({m})"),
            WorkspaceStatus::Destroying => write!(f, "destroying"),
            WorkspaceStatus::DeployFailed { reason } => write!(f, "deploy_failed: {reason}"),
            WorkspaceStatus::DestroyFailed { reason } => write!(f, "destroy_failed: {reason}"),
        }
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
