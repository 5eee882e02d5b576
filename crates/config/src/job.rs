// SPDX-License-Identifier: MIT

//! Job declarations as they appear in workspace config and in standalone
//! `<config_root>/jobs/<name>.json` files.

use crate::error::ConfigError;
use cadence_core::cron::Schedule;
use cadence_core::event::EventKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn default_timeout_secs() -> u64 {
    600
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Script,
    Command,
    Template,
}

impl JobKind {
    fn as_str(&self) -> &'static str {
        match self {
            JobKind::Script => "script",
            JobKind::Command => "command",
            JobKind::Template => "template",
        }
    }
}

/// The job body, matching its declared [`JobKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobBody {
    Script(String),
    Command(String),
    Template(String),
}

/// What fires this job: a CRON schedule, one or more lifecycle event tags,
/// or both mixed in the same `schedule` array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobTrigger {
    pub cron: Schedule,
    pub events: Vec<EventKind>,
}

impl JobTrigger {
    pub fn is_empty(&self) -> bool {
        self.cron.is_never() && self.events.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawJob {
    name: String,
    #[serde(rename = "type")]
    kind: JobKind,
    schedule: serde_json::Value,
    script: Option<String>,
    command: Option<String>,
    template: Option<String>,
    #[serde(default)]
    environment: HashMap<String, String>,
    working_dir: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    timeout: u64,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    depends_on: Vec<String>,
}

/// A validated job declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub name: String,
    pub kind: JobKind,
    pub body: JobBody,
    pub trigger: JobTrigger,
    pub environment: HashMap<String, String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
    pub enabled: bool,
    pub depends_on: Vec<String>,
}

fn parse_trigger(value: &serde_json::Value) -> Result<JobTrigger, cadence_core::CronError> {
    let items: Vec<String> = match value {
        serde_json::Value::String(s) => vec![s.clone()],
        serde_json::Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or(cadence_core::CronError::InvalidScheduleShape)?,
        _ => return Err(cadence_core::CronError::InvalidScheduleShape),
    };

    let mut cron_exprs = Vec::new();
    let mut events = Vec::new();
    for item in items {
        if let Some(kind) = EventKind::from_tag(&item) {
            events.push(kind);
        } else {
            cron_exprs.push(cadence_core::cron::CronExpr::parse(&item)?);
        }
    }
    Ok(JobTrigger { cron: Schedule(cron_exprs), events })
}

pub(crate) fn parse_jobs(workspace: &str, raw: Vec<RawJob>) -> Result<Vec<JobConfig>, ConfigError> {
    let mut seen = std::collections::HashSet::new();
    let mut jobs = Vec::with_capacity(raw.len());
    for raw in raw {
        if raw.name.trim().is_empty() || !seen.insert(raw.name.clone()) {
            return Err(ConfigError::InvalidJobName(workspace.to_string(), raw.name));
        }

        let body = match raw.kind {
            JobKind::Script => raw.script.clone().map(JobBody::Script),
            JobKind::Command => raw.command.clone().map(JobBody::Command),
            JobKind::Template => raw.template.clone().map(JobBody::Template),
        };
        let present = [&raw.script, &raw.command, &raw.template].iter().filter(|v| v.is_some()).count();
        let body = match (body, present) {
            (Some(body), 1) => body,
            _ => {
                return Err(ConfigError::JobBodyMismatch(
                    workspace.to_string(),
                    raw.name.clone(),
                    raw.kind.as_str().to_string(),
                ))
            }
        };

        let trigger = parse_trigger(&raw.schedule).map_err(|source| ConfigError::InvalidSchedule {
            workspace: format!("{workspace}/{}", raw.name),
            source,
        })?;

        jobs.push(JobConfig {
            name: raw.name,
            kind: raw.kind,
            body,
            trigger,
            environment: raw.environment,
            working_dir: raw.working_dir,
            timeout: Duration::from_secs(raw.timeout),
            enabled: raw.enabled,
            depends_on: raw.depends_on,
        });
    }

    for job in &jobs {
        for dep in &job.depends_on {
            if !jobs.iter().any(|j| &j.name == dep) {
                return Err(ConfigError::UnknownDependency(workspace.to_string(), job.name.clone(), dep.clone()));
            }
        }
    }

    if let Some(cycle_member) = crate::dag::detect_cycle(&jobs) {
        return Err(ConfigError::CircularDependency(workspace.to_string(), cycle_member));
    }

    Ok(jobs)
}

/// A minimal runnable `JobConfig` for dependency-graph and resolver tests
/// in this and downstream crates.
#[cfg(any(test, feature = "test-support"))]
pub fn test_job(name: &str, depends_on: &[&str]) -> JobConfig {
    JobConfig {
        name: name.to_string(),
        kind: JobKind::Command,
        body: JobBody::Command("true".to_string()),
        trigger: JobTrigger { cron: Schedule::never(), events: vec![EventKind::Deployment] },
        environment: HashMap::new(),
        working_dir: None,
        timeout: Duration::from_secs(default_timeout_secs()),
        enabled: true,
        depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
