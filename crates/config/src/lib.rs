// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cadence-config: the validated in-memory config model and the loader that
//! builds it from a config root directory.

mod dag;
mod error;
mod job;
mod loader;
mod workspace;

pub use error::ConfigError;
pub use job::{JobBody, JobConfig, JobKind, JobTrigger};
pub use loader::{load_config_root, LoadedConfig};
pub use workspace::{CustomDeployCommands, CustomDestroyCommands, ScheduleMode, WorkspaceConfig};

#[cfg(any(test, feature = "test-support"))]
pub use job::test_job;
