// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cadence-iac: the abstraction over the external provisioning subprocess
//! (OpenTofu/Terraform) — `Deploy`/`DeployInMode`/`Destroy` for workspaces,
//! raw `Init`/`Plan`/`Apply`/`Destroy(dir)` for template-type jobs, the
//! template-source sync rules, and the minimal template registry.

mod custom;
mod driver;
mod error;
mod metadata;
mod process;
mod sync;
mod template;

pub use driver::{IacDriver, ProcessIacDriver};
pub use error::IacError;
pub use metadata::{ProvisionerMetadata, METADATA_FILE_NAME};
pub use process::{run_step, DEFAULT_STEP_TIMEOUT};
pub use sync::sync_template;
pub use template::{hash_template_dir, FsTemplateRegistry, TemplateRegistry};
