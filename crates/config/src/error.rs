// SPDX-License-Identifier: MIT

use cadence_core::CronError;
use thiserror::Error;

/// Configuration errors. Each variant names the offending workspace (and,
/// where relevant, job) so the loader can skip just that entity and keep
/// loading the rest of the config root.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("workspace {workspace:?}: invalid schedule: {source}")]
    InvalidSchedule {
        workspace: String,
        #[source]
        source: CronError,
    },

    #[error("workspace {0:?}: deploy_schedule/destroy_schedule and mode_schedules are mutually exclusive")]
    ScheduleModeConflict(String),

    #[error("workspace {0:?}: mode_schedules present but template is not set")]
    MissingTemplateForModes(String),

    #[error("workspace {0:?}: neither deploy_schedule/destroy_schedule nor mode_schedules is set")]
    NoScheduleConfigured(String),

    #[error("workspace {0:?}: job {1:?} depends on unknown job {2:?}")]
    UnknownDependency(String, String, String),

    #[error("workspace {0:?}: circular dependency involving job {1:?}")]
    CircularDependency(String, String),

    #[error("workspace {workspace:?}: custom_{which} requires at least one non-blank command")]
    EmptyCustomCommandBlock { workspace: String, which: &'static str },

    #[error("workspace {workspace:?}: custom_{which} has a present but whitespace-only command field")]
    BlankCustomCommandField { workspace: String, which: &'static str },

    #[error("workspace {0:?}: job {1:?} of type {2:?} must specify exactly one of script/command/template matching its type")]
    JobBodyMismatch(String, String, String),

    #[error("workspace {0:?}: job {1:?} has an empty or duplicate name")]
    InvalidJobName(String, String),

    #[error("workspace {workspace:?}: no IaC entry file and no template reference to resolve one from")]
    UnresolvableEntryFile { workspace: String },

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
