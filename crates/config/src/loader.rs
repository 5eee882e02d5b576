// SPDX-License-Identifier: MIT

//! Scans a config root directory into a [`LoadedConfig`].
//!
//! Per-workspace and per-standalone-job configuration errors are soft: the
//! offending entity is skipped and recorded in `errors`, while the rest of
//! the config root loads normally (§7, "Configuration errors").

use crate::error::ConfigError;
use crate::job::{parse_jobs, JobConfig, RawJob};
use crate::workspace::WorkspaceConfig;
use std::collections::BTreeMap;
use std::path::Path;

const ENTRY_FILE_CANDIDATES: &[&str] = &["main.tf", "main.tf.json"];

#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub workspaces: BTreeMap<String, WorkspaceConfig>,
    pub standalone_jobs: BTreeMap<String, JobConfig>,
    /// (entity name, error) pairs for configuration that failed to load but
    /// did not abort the rest of the scan.
    pub errors: Vec<(String, ConfigError)>,
}

fn read_to_string(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.display().to_string(), source })
}

fn has_local_entry_file(workspace_dir: &Path) -> bool {
    ENTRY_FILE_CANDIDATES.iter().any(|f| workspace_dir.join(f).is_file())
}

/// Load every workspace under `<config_root>/workspaces/` and every
/// standalone job under `<config_root>/jobs/`.
pub fn load_config_root(config_root: &Path) -> LoadedConfig {
    let mut loaded = LoadedConfig::default();

    let workspaces_dir = config_root.join("workspaces");
    if let Ok(entries) = std::fs::read_dir(&workspaces_dir) {
        for entry in entries.flatten() {
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match load_one_workspace(&entry.path(), &name) {
                Ok(cfg) => {
                    loaded.workspaces.insert(name, cfg);
                }
                Err(e) => loaded.errors.push((name, e)),
            }
        }
    }

    let jobs_dir = config_root.join("jobs");
    if let Ok(entries) = std::fs::read_dir(&jobs_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let name = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            match load_one_standalone_job(&path, &name) {
                Ok(job) => {
                    loaded.standalone_jobs.insert(name, job);
                }
                Err(e) => loaded.errors.push((name, e)),
            }
        }
    }

    loaded
}

fn load_one_workspace(workspace_dir: &Path, name: &str) -> Result<WorkspaceConfig, ConfigError> {
    let config_path = workspace_dir.join("config.json");
    let raw_json = read_to_string(&config_path)?;
    let cfg = WorkspaceConfig::from_json(name, &raw_json)?;
    if cfg.template.is_none() && !has_local_entry_file(workspace_dir) {
        return Err(ConfigError::UnresolvableEntryFile { workspace: name.to_string() });
    }
    Ok(cfg)
}

fn load_one_standalone_job(path: &Path, name: &str) -> Result<JobConfig, ConfigError> {
    let raw_json = read_to_string(path)?;
    let raw: RawJob = serde_json::from_str(&raw_json).map_err(|source| ConfigError::Json { path: path.display().to_string(), source })?;
    let jobs = parse_jobs("_standalone_", vec![raw])?;
    jobs.into_iter().next().ok_or_else(|| ConfigError::InvalidJobName("_standalone_".to_string(), name.to_string()))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
