// SPDX-License-Identifier: MIT

//! The job engine (spec.md §4.3): decides which jobs are runnable for a
//! trigger, resolves their dependency order, and fans out execution with a
//! barrier at each readiness wave. One [`JobEngine`] instance is shared
//! across a daemon process; [`JobEngine::run_cycle`] is invoked once per
//! scheduler tick (time-triggered jobs) and once per lifecycle event
//! (event-triggered jobs) per spec.md §4.3 "Execution for an event".

use crate::error::JobError;
use crate::exec::{self, ExecutionOutcome};
use crate::resolver::Resolver;
use cadence_config::{JobBody, JobConfig};
use cadence_core::cron::{window_fired, CalendarMinute};
use cadence_core::event::DeploymentEvent;
use cadence_core::job::{ExecutionId, JobExecution, JobId, JobStatus};
use cadence_core::workspace::WorkspaceId;
use cadence_iac::{sync_template, IacDriver, TemplateRegistry};
use cadence_state::JobStateStore;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// What caused this call to `run_cycle`: a scheduler-loop time tick, or a
/// workspace lifecycle event. Standalone jobs are always ticked, never
/// handed an event (spec.md §4.3 "Standalone jobs ... have no associated
/// workspace lifecycle events").
#[derive(Debug, Clone)]
pub enum CycleTrigger {
    Tick { at: CalendarMinute, now_epoch_ms: u64 },
    Event(DeploymentEvent),
}

impl CycleTrigger {
    /// The instant this trigger fired, shared by every record this cycle
    /// writes (job start/finish timestamps, the CRON window anchor) so a
    /// cycle's bookkeeping reflects one consistent "now" rather than
    /// whatever the wall clock reads while jobs are in flight.
    fn now_epoch_ms(&self) -> u64 {
        match self {
            CycleTrigger::Tick { now_epoch_ms, .. } => *now_epoch_ms,
            CycleTrigger::Event(event) => event.epoch_ms,
        }
    }
}

/// Does `job` match this trigger, independent of dependency/running state?
///
/// CRON jobs use the same window rule as workspace schedules (spec.md
/// §4.3 "Time-triggered CRON jobs use the same window-based rule as
/// workspaces, with `last_run` as the anchor"). Event-tagged jobs match
/// exclusively on event type and never fire on a time tick.
fn job_matches_trigger(job: &JobConfig, trigger: &CycleTrigger, last_run_epoch_ms: Option<u64>) -> bool {
    match trigger {
        CycleTrigger::Tick { at, .. } => {
            if job.trigger.cron.is_never() {
                return false;
            }
            let last_action = last_run_epoch_ms.map(CalendarMinute::from_epoch_ms);
            window_fired(&job.trigger.cron, *at, last_action).is_some()
        }
        CycleTrigger::Event(event) => job.trigger.events.contains(&event.kind),
    }
}

/// Outcome of one job's execution within a cycle, returned to the caller
/// for logging/status reporting.
#[derive(Debug, Clone)]
pub struct JobCycleResult {
    pub job_name: String,
    pub outcome: Result<ExecutionOutcome, String>,
}

/// Report for one full `run_cycle` call.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub dispatched: Vec<JobCycleResult>,
    /// Jobs that matched the trigger and were ready to run in principle
    /// but never became runnable this cycle because a dependency failed,
    /// timed out, or was itself blocked (spec.md §7 "Dependency-blocked
    /// jobs — not an error; logged and left pending for the next cycle").
    pub blocked: Vec<String>,
}

/// Ties the resolver, executor, and state store together for one
/// workspace's (or the standalone pool's) jobs.
pub struct JobEngine {
    iac: Arc<dyn IacDriver>,
    templates: Arc<dyn TemplateRegistry>,
    job_state: Arc<JobStateStore>,
    /// Live executions, keyed by `(workspace_id, job_name)`, for
    /// `cadence status`/`cadence logs` to read PID/elapsed time of a
    /// still-running job (spec.md §3 `JobExecution`, §5 "Record PID while
    /// running to support external kill").
    live: Arc<Mutex<HashMap<(String, String), JobExecution>>>,
}

impl JobEngine {
    pub fn new(iac: Arc<dyn IacDriver>, templates: Arc<dyn TemplateRegistry>, job_state: Arc<JobStateStore>) -> Self {
        Self { iac, templates, job_state, live: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Snapshot of jobs currently executing, for status/log queries.
    pub fn live_executions(&self) -> Vec<JobExecution> {
        self.live.lock().values().cloned().collect()
    }

    /// Run one dispatch cycle over `jobs` (a workspace's jobs, or the
    /// standalone pool under `_standalone_`) for `trigger`.
    pub async fn run_cycle(&self, workspace_id: &str, jobs: &[JobConfig], trigger: CycleTrigger, working_dir: &Path) -> CycleReport {
        let now = trigger.now_epoch_ms();
        let mut runnable = Vec::new();
        let mut completed = HashSet::new();
        let mut failed = HashSet::new();

        for job in jobs {
            let record = self.job_state.get(workspace_id, &job.name);
            match record.status {
                JobStatus::Success => {
                    completed.insert(job.name.clone());
                }
                JobStatus::Failed | JobStatus::Timeout => {
                    failed.insert(job.name.clone());
                }
                _ => {}
            }
            if !job.enabled || record.status == JobStatus::Running || record.status == JobStatus::Disabled {
                continue;
            }
            if job_matches_trigger(job, &trigger, record.last_run) {
                runnable.push(job.name.clone());
            }
        }

        let mut resolver = Resolver::new(jobs, runnable, completed, failed);
        let mut report = CycleReport::default();
        let mut in_flight: JoinSet<(String, Result<ExecutionOutcome, JobError>)> = JoinSet::new();

        loop {
            for name in resolver.drain_ready() {
                let job = match jobs.iter().find(|j| j.name == name) {
                    Some(j) => j.clone(),
                    None => continue,
                };
                if let Err(e) = self.job_state.start(workspace_id, &job.name, now) {
                    tracing::warn!(workspace = %workspace_id, job = %job.name, error = %e, "failed to persist job start");
                }
                self.record_live_start(workspace_id, &job, now);

                let iac = Arc::clone(&self.iac);
                let templates = Arc::clone(&self.templates);
                let working_dir = working_dir.to_path_buf();
                let workspace_id_owned = workspace_id.to_string();
                in_flight.spawn(async move {
                    let outcome = run_one(&job, &working_dir, &workspace_id_owned, iac.as_ref(), templates.as_ref()).await;
                    (job.name.clone(), outcome)
                });
            }

            // Nothing in flight and nothing newly ready: either the cycle
            // finished cleanly or it is stalled on blocked dependencies
            // (spec.md §4.3 step 7, "no worker running and no new ready
            // jobs appear"). Either way, stop.
            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let (name, outcome) = match joined {
                Ok(pair) => pair,
                Err(join_err) => {
                    tracing::error!(workspace = %workspace_id, error = %join_err, "job task panicked");
                    continue;
                }
            };

            self.live.lock().remove(&(workspace_id.to_string(), name.clone()));

            match &outcome {
                Ok(result) if result.timed_out => {
                    let _ = self.job_state.record_timeout(workspace_id, &name, now);
                    resolver.mark_failed(&name);
                }
                Ok(result) if result.succeeded() => {
                    let _ = self.job_state.record_success(workspace_id, &name, now, result.exit_code.unwrap_or(0));
                    resolver.mark_success(&name);
                }
                Ok(result) => {
                    let _ = self.job_state.record_failure(workspace_id, &name, now, result.exit_code, "job exited non-zero".to_string());
                    resolver.mark_failed(&name);
                }
                Err(e) => {
                    let _ = self.job_state.record_failure(workspace_id, &name, now, None, e.to_string());
                    resolver.mark_failed(&name);
                }
            }

            report.dispatched.push(JobCycleResult { job_name: name, outcome: outcome.map_err(|e| e.to_string()) });
        }

        for name in jobs.iter().map(|j| j.name.clone()) {
            if !report.dispatched.iter().any(|r| r.job_name == name) && resolver_would_have_run(&name, jobs, &trigger, &self.job_state, workspace_id) {
                report.blocked.push(name);
            }
        }

        report
    }

    fn record_live_start(&self, workspace_id: &str, job: &JobConfig, started_epoch_ms: u64) {
        let execution = JobExecution {
            id: ExecutionId::new(),
            job_id: JobId::new(),
            workspace_id: WorkspaceId::from_string(workspace_id),
            trigger: job.name.clone(),
            started_epoch_ms,
            finished_epoch_ms: None,
            status: JobStatus::Running,
            exit_code: None,
            output_tail: String::new(),
        };
        self.live.lock().insert((workspace_id.to_string(), job.name.clone()), execution);
    }
}

/// Did `name` match the trigger this cycle but never get a chance to run
/// (permanently blocked by a failed dependency)? Used only to populate
/// `CycleReport::blocked` for logging; re-derives trigger-match rather
/// than threading it through the resolver, since it is purely diagnostic.
fn resolver_would_have_run(name: &str, jobs: &[JobConfig], trigger: &CycleTrigger, job_state: &JobStateStore, workspace_id: &str) -> bool {
    let Some(job) = jobs.iter().find(|j| j.name == name) else { return false };
    let record = job_state.get(workspace_id, name);
    job.enabled && record.status != JobStatus::Running && job_matches_trigger(job, trigger, record.last_run)
}

async fn run_one(job: &JobConfig, working_dir: &Path, workspace_id: &str, iac: &dyn IacDriver, templates: &dyn TemplateRegistry) -> Result<ExecutionOutcome, JobError> {
    let job_subdir_root = working_dir.join("jobs");
    let job_dir = job.working_dir.clone().unwrap_or_else(|| working_dir.to_path_buf());
    let env = exec::build_env(workspace_id, job, working_dir);

    if let JobBody::Template(template_name) = &job.body {
        prepare_template_job_dir(job, template_name, &job_subdir_root, templates).await?;
    }

    exec::run_job(job, &job_dir, &env, iac, &job_subdir_root).await
}

async fn prepare_template_job_dir(job: &JobConfig, template_name: &str, job_subdir_root: &Path, templates: &dyn TemplateRegistry) -> Result<(), JobError> {
    let source_dir = templates.source_dir(template_name).await.ok_or_else(|| JobError::Template {
        job: job.name.clone(),
        source: cadence_iac::IacError::TemplateNotFound(template_name.to_string()),
    })?;
    let job_dir: PathBuf = job_subdir_root.join(&job.name);
    let job_name = job.name.clone();
    tokio::task::spawn_blocking(move || sync_template(&source_dir, &job_dir, &[]))
        .await
        .map_err(|e| JobError::ScriptSetup { job: job_name.clone(), source: std::io::Error::new(std::io::ErrorKind::Other, e) })?
        .map_err(|source| JobError::ScriptSetup { job: job_name, source })?;
    Ok(())
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
