// SPDX-License-Identifier: MIT

//! Workspace configuration: the validated, in-memory shape of
//! `<config_root>/workspaces/<name>/config.json`.

use crate::error::ConfigError;
use crate::job::{parse_jobs, JobConfig, RawJob};
use cadence_core::cron::Schedule;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Either a fixed deploy/destroy schedule pair, or a set of named modes
/// each with their own schedule. Mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleMode {
    Fixed { deploy: Schedule, destroy: Schedule },
    Modes(BTreeMap<String, Schedule>),
}

impl ScheduleMode {
    pub fn is_modal(&self) -> bool {
        matches!(self, ScheduleMode::Modes(_))
    }
}

/// Command-line overrides substituted for the default deploy steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomDeployCommands {
    pub init_command: Option<String>,
    pub plan_command: Option<String>,
    pub apply_command: Option<String>,
}

impl CustomDeployCommands {
    fn is_blank(&self) -> bool {
        [&self.init_command, &self.plan_command, &self.apply_command]
            .iter()
            .all(|c| c.as_deref().map(str::trim).unwrap_or("").is_empty())
    }

    /// Is any individually-present field whitespace-only? A field that is
    /// absent entirely (`None`) falls back to the default step and is
    /// fine; a field that is present but blank is not (spec.md §4.5
    /// "non-empty whitespace-only strings are invalid").
    fn has_blank_present_field(&self) -> bool {
        [&self.init_command, &self.plan_command, &self.apply_command]
            .iter()
            .any(|c| matches!(c, Some(s) if s.trim().is_empty()))
    }
}

/// Command-line overrides substituted for the default destroy steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomDestroyCommands {
    pub init_command: Option<String>,
    pub destroy_command: Option<String>,
}

impl CustomDestroyCommands {
    fn is_blank(&self) -> bool {
        [&self.init_command, &self.destroy_command].iter().all(|c| c.as_deref().map(str::trim).unwrap_or("").is_empty())
    }

    /// See [`CustomDeployCommands::has_blank_present_field`].
    fn has_blank_present_field(&self) -> bool {
        [&self.init_command, &self.destroy_command].iter().any(|c| matches!(c, Some(s) if s.trim().is_empty()))
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
struct RawWorkspace {
    #[serde(default = "default_true")]
    enabled: bool,
    template: Option<String>,
    #[serde(default)]
    deploy_schedule: Option<serde_json::Value>,
    #[serde(default)]
    destroy_schedule: Option<serde_json::Value>,
    #[serde(default)]
    mode_schedules: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    jobs: Vec<RawJob>,
    custom_deploy: Option<CustomDeployCommands>,
    custom_destroy: Option<CustomDestroyCommands>,
    #[serde(default)]
    description: Option<String>,
}

/// A validated workspace declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub name: String,
    pub enabled: bool,
    pub template: Option<String>,
    pub schedule: ScheduleMode,
    pub jobs: Vec<JobConfig>,
    pub custom_deploy: Option<CustomDeployCommands>,
    pub custom_destroy: Option<CustomDestroyCommands>,
    pub description: Option<String>,
}

impl WorkspaceConfig {
    /// Parse and validate a workspace's `config.json` contents.
    pub fn from_json(name: &str, raw_json: &str) -> Result<Self, ConfigError> {
        let raw: RawWorkspace = serde_json::from_str(raw_json).map_err(|source| ConfigError::Json {
            path: format!("workspaces/{name}/config.json"),
            source,
        })?;
        Self::from_raw(name, raw)
    }

    fn from_raw(name: &str, raw: RawWorkspace) -> Result<Self, ConfigError> {
        let has_fixed = raw.deploy_schedule.is_some() || raw.destroy_schedule.is_some();
        let has_modes = raw.mode_schedules.is_some();

        if has_fixed && has_modes {
            return Err(ConfigError::ScheduleModeConflict(name.to_string()));
        }
        if !has_fixed && !has_modes {
            return Err(ConfigError::NoScheduleConfigured(name.to_string()));
        }

        let schedule = if has_modes {
            if raw.template.is_none() {
                return Err(ConfigError::MissingTemplateForModes(name.to_string()));
            }
            let mut modes = BTreeMap::new();
            for (mode_name, value) in raw.mode_schedules.unwrap_or_default() {
                let parsed = Schedule::from_json(&value).map_err(|source| ConfigError::InvalidSchedule {
                    workspace: format!("{name}:mode={mode_name}"),
                    source,
                })?;
                modes.insert(mode_name, parsed);
            }
            ScheduleMode::Modes(modes)
        } else {
            let deploy = raw
                .deploy_schedule
                .as_ref()
                .map(Schedule::from_json)
                .transpose()
                .map_err(|source| ConfigError::InvalidSchedule { workspace: format!("{name}:deploy_schedule"), source })?
                .unwrap_or_default();
            let destroy = raw
                .destroy_schedule
                .as_ref()
                .map(Schedule::from_json)
                .transpose()
                .map_err(|source| ConfigError::InvalidSchedule { workspace: format!("{name}:destroy_schedule"), source })?
                .unwrap_or_default();
            ScheduleMode::Fixed { deploy, destroy }
        };

        if let Some(custom_deploy) = &raw.custom_deploy {
            if custom_deploy.is_blank() {
                return Err(ConfigError::EmptyCustomCommandBlock { workspace: name.to_string(), which: "deploy" });
            }
            if custom_deploy.has_blank_present_field() {
                return Err(ConfigError::BlankCustomCommandField { workspace: name.to_string(), which: "deploy" });
            }
        }
        if let Some(custom_destroy) = &raw.custom_destroy {
            if custom_destroy.is_blank() {
                return Err(ConfigError::EmptyCustomCommandBlock { workspace: name.to_string(), which: "destroy" });
            }
            if custom_destroy.has_blank_present_field() {
                return Err(ConfigError::BlankCustomCommandField { workspace: name.to_string(), which: "destroy" });
            }
        }

        let jobs = parse_jobs(name, raw.jobs)?;

        Ok(WorkspaceConfig {
            name: name.to_string(),
            enabled: raw.enabled,
            template: raw.template,
            schedule,
            jobs,
            custom_deploy: raw.custom_deploy,
            custom_destroy: raw.custom_destroy,
            description: raw.description,
        })
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
