// SPDX-License-Identifier: MIT

//! `.provisioner-metadata.json`: the core's own bookkeeping file inside a
//! workspace's working directory, recording which template content hash was
//! used at the most recent deployment (spec.md §4.6).

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const METADATA_FILE_NAME: &str = ".provisioner-metadata.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionerMetadata {
    pub template: Option<String>,
    pub template_hash: Option<String>,
    pub last_deployed_epoch_ms: Option<u64>,
}

pub fn read(working_dir: &Path) -> ProvisionerMetadata {
    std::fs::read_to_string(working_dir.join(METADATA_FILE_NAME))
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn write(working_dir: &Path, metadata: &ProvisionerMetadata) -> std::io::Result<()> {
    let serialized = serde_json::to_string_pretty(metadata).unwrap_or_default();
    std::fs::write(working_dir.join(METADATA_FILE_NAME), serialized)
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
