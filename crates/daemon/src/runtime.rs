// SPDX-License-Identifier: MIT

//! The scheduler loop (spec.md §4.2): once per tick, reconcile every
//! enabled workspace's deploy/destroy/mode state against its schedule,
//! dispatch operations through [`cadence_iac::IacDriver`], and hand
//! lifecycle events to the [`JobEngine`]. Also drives the CRON side of
//! job scheduling, which runs on the same tick independent of any
//! workspace transition.

use cadence_config::{JobConfig, LoadedConfig, ScheduleMode, WorkspaceConfig};
use cadence_core::clock::Clock;
use cadence_core::cron::{last_fire_at_or_before, window_fired, CalendarMinute, Schedule};
use cadence_core::event::{DeploymentEvent, EventKind};
use cadence_core::workspace::WorkspaceStatus;
use cadence_iac::IacDriver;
use cadence_iac::TemplateRegistry;
use cadence_jobs::{CycleTrigger, JobEngine};
use cadence_state::{JobStateStore, SchedulerStore};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::logs::WorkspaceLogs;

/// Reserved workspace id standalone jobs are grouped under (spec.md §3).
pub const STANDALONE: &str = "_standalone_";

/// Everything the scheduler loop and the IPC listener share, wired up
/// once at startup (spec.md §9 "Global singletons ... Expose as an
/// injected dependency so tests can swap it").
pub struct Runtime<C: Clock> {
    pub config_root: PathBuf,
    pub state_root: PathBuf,
    config: RwLock<LoadedConfig>,
    pub scheduler_store: Arc<SchedulerStore>,
    pub job_state: Arc<JobStateStore>,
    iac: Arc<dyn IacDriver>,
    templates: Arc<dyn TemplateRegistry>,
    job_engine: Arc<JobEngine>,
    pub logs: Arc<WorkspaceLogs>,
    clock: C,
    /// In-flight deploy/destroy operation workers, tracked only so a
    /// graceful shutdown can optionally wait for them to finish draining
    /// (spec.md §5 "running operations are allowed to finish OR are
    /// signaled; either behavior is acceptable").
    operations: Mutex<JoinSet<()>>,
}

impl<C: Clock> Runtime<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config_root: PathBuf,
        state_root: PathBuf,
        config: LoadedConfig,
        scheduler_store: Arc<SchedulerStore>,
        job_state: Arc<JobStateStore>,
        iac: Arc<dyn IacDriver>,
        templates: Arc<dyn TemplateRegistry>,
        job_engine: Arc<JobEngine>,
        logs: Arc<WorkspaceLogs>,
        clock: C,
    ) -> Self {
        Self {
            config_root,
            state_root,
            config: RwLock::new(config),
            scheduler_store,
            job_state,
            iac,
            templates,
            job_engine,
            logs,
            clock,
            operations: Mutex::new(JoinSet::new()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn job_engine(&self) -> &Arc<JobEngine> {
        &self.job_engine
    }

    pub fn iac(&self) -> &Arc<dyn IacDriver> {
        &self.iac
    }

    pub fn templates(&self) -> &Arc<dyn TemplateRegistry> {
        &self.templates
    }

    /// Snapshot of the currently loaded config, for the IPC listener's
    /// read-only queries.
    pub fn workspace(&self, name: &str) -> Option<WorkspaceConfig> {
        self.config.read().workspaces.get(name).cloned()
    }

    pub fn workspace_names(&self) -> Vec<String> {
        self.config.read().workspaces.keys().cloned().collect()
    }

    pub fn standalone_jobs(&self) -> Vec<cadence_config::JobConfig> {
        self.config.read().standalone_jobs.values().cloned().collect()
    }

    /// Re-scan the config root and reconcile job state against it
    /// (spec.md §4.3: "jobs become eligible again after a configuration
    /// modification, which resets status to pending"). A job whose
    /// declaration changed since the last tick has its state reset; a job
    /// dropped from config (or whose whole workspace was removed) has its
    /// state pruned. Soft-fails per workspace like the initial load
    /// (spec.md §7); load errors are logged and the previously loaded
    /// entity is kept in place.
    fn reconcile_config(&self, now: u64) {
        let loaded = cadence_config::load_config_root(&self.config_root);
        {
            let previous = self.config.read();

            let old_standalone: Vec<JobConfig> = previous.standalone_jobs.values().cloned().collect();
            let new_standalone: Vec<JobConfig> = loaded.standalone_jobs.values().cloned().collect();
            reconcile_job_list(&self.job_state, STANDALONE, &old_standalone, &new_standalone, now);

            for (name, ws) in &loaded.workspaces {
                let old_jobs = previous.workspaces.get(name).map(|w| w.jobs.as_slice()).unwrap_or(&[]);
                reconcile_job_list(&self.job_state, name, old_jobs, &ws.jobs, now);
            }
            for name in previous.workspaces.keys() {
                if !loaded.workspaces.contains_key(name) && !self.job_state.snapshot_workspace(name).is_empty() {
                    if let Err(e) = self.job_state.cleanup_job_states(name, &[], now) {
                        tracing::warn!(workspace = %name, error = %e, "failed to clean up job state for removed workspace");
                    }
                }
            }
        }
        for (path, err) in &loaded.errors {
            tracing::warn!(path = %path, error = %err, "config entity failed to load; keeping previous state for it");
        }
        *self.config.write() = clone_loaded(&loaded);
    }

    fn working_dir(&self, workspace_name: &str) -> PathBuf {
        self.iac.working_dir(workspace_name)
    }

    /// Run one scheduler tick: reconcile every enabled workspace, then run
    /// one job-engine cycle per workspace (and the standalone pool) for
    /// CRON-triggered jobs.
    pub async fn tick(self: &Arc<Self>) {
        let now = self.clock.epoch_ms();
        self.reconcile_config(now);
        let at = CalendarMinute::from_epoch_ms(now);

        let workspaces: Vec<WorkspaceConfig> = self.config.read().workspaces.values().cloned().collect();
        for ws in &workspaces {
            if !ws.enabled {
                continue;
            }
            self.tick_workspace(ws, at, now);
        }

        for ws in &workspaces {
            if !ws.enabled {
                continue;
            }
            let working_dir = self.working_dir(&ws.name);
            let report = self.job_engine.run_cycle(&ws.name, &ws.jobs, CycleTrigger::Tick { at, now_epoch_ms: now }, &working_dir).await;
            self.log_job_report(&ws.name, &report);
        }

        let standalone = self.config.read().standalone_jobs.values().cloned().collect::<Vec<_>>();
        if !standalone.is_empty() {
            let working_dir = self.working_dir(STANDALONE);
            let report = self.job_engine.run_cycle(STANDALONE, &standalone, CycleTrigger::Tick { at, now_epoch_ms: now }, &working_dir).await;
            self.log_job_report(STANDALONE, &report);
        }
    }

    /// Emit `@reboot` for every workspace's jobs and the standalone pool,
    /// once, at process start (spec.md §4.2 "Startup").
    pub async fn fire_reboot(self: &Arc<Self>) {
        let now = self.clock.epoch_ms();
        let workspaces: Vec<WorkspaceConfig> = self.config.read().workspaces.values().cloned().collect();
        for ws in &workspaces {
            let event = DeploymentEvent { kind: EventKind::Reboot, workspace_id: ws.name.as_str().into(), epoch_ms: now, mode: None, error: None };
            let working_dir = self.working_dir(&ws.name);
            let report = self.job_engine.run_cycle(&ws.name, &ws.jobs, CycleTrigger::Event(event), &working_dir).await;
            self.log_job_report(&ws.name, &report);
        }
        let standalone = self.config.read().standalone_jobs.values().cloned().collect::<Vec<_>>();
        if !standalone.is_empty() {
            let event = DeploymentEvent { kind: EventKind::Reboot, workspace_id: STANDALONE.into(), epoch_ms: now, mode: None, error: None };
            let working_dir = self.working_dir(STANDALONE);
            let report = self.job_engine.run_cycle(STANDALONE, &standalone, CycleTrigger::Event(event), &working_dir).await;
            self.log_job_report(STANDALONE, &report);
        }
    }

    fn tick_workspace(self: &Arc<Self>, ws: &WorkspaceConfig, at: CalendarMinute, now: u64) {
        let record = self.scheduler_store.get(&ws.name);
        if record.status.is_busy() {
            return;
        }

        match &ws.schedule {
            ScheduleMode::Fixed { deploy, destroy } => match &record.status {
                WorkspaceStatus::Destroyed | WorkspaceStatus::DeployFailed { .. } => {
                    let last = record.last_deployed.map(CalendarMinute::from_epoch_ms);
                    if window_fired(deploy, at, last).is_some() {
                        self.dispatch_deploy(ws.clone(), None, now);
                    }
                }
                WorkspaceStatus::Deployed { .. } | WorkspaceStatus::DestroyFailed { .. } => {
                    if !destroy.is_never() {
                        let last = record.last_destroyed.map(CalendarMinute::from_epoch_ms);
                        if window_fired(destroy, at, last).is_some() {
                            self.dispatch_destroy(ws.clone(), now);
                        }
                    }
                }
                _ => {}
            },
            ScheduleMode::Modes(modes) => {
                let target = target_mode(modes, at);
                match &record.status {
                    WorkspaceStatus::Destroyed => {
                        if let Some(mode) = target {
                            self.dispatch_deploy(ws.clone(), Some(mode), now);
                        }
                    }
                    WorkspaceStatus::Deployed { .. } => {
                        let effective = target.or_else(|| record.current_mode.clone());
                        if let Some(mode) = effective {
                            if Some(mode.as_str()) != record.current_mode.as_deref() {
                                self.dispatch_deploy(ws.clone(), Some(mode), now);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    /// Dispatch a deploy (scheduled or manual): transition to `Deploying`,
    /// spawn the operation worker, and wire its completion back into the
    /// state store and job engine.
    pub fn dispatch_deploy(self: &Arc<Self>, ws: WorkspaceConfig, mode: Option<String>, now: u64) {
        if let Err(e) = self.scheduler_store.begin_deploy(&ws.name, now, mode.clone()) {
            tracing::warn!(workspace = %ws.name, error = %e, "failed to persist begin_deploy");
        }
        self.logs.append(&ws.name, &format!("[{now}] deploy dispatched mode={mode:?}"));

        let this = Arc::clone(self);
        self.operations.lock().spawn(async move {
            let now_ms = this.clock.epoch_ms();
            let result = match &mode {
                Some(m) => this.iac.deploy_in_mode(&ws, m, now_ms).await,
                None => this.iac.deploy(&ws, now_ms).await,
            };
            let finished = this.clock.epoch_ms();
            match result {
                Ok(()) => {
                    if let Err(e) = this.scheduler_store.record_deploy_success(&ws.name, finished, mode.clone()) {
                        tracing::warn!(workspace = %ws.name, error = %e, "failed to persist deploy success");
                    }
                    this.logs.append(&ws.name, &format!("[{finished}] deploy succeeded mode={mode:?}"));
                    let event = DeploymentEvent { kind: EventKind::Deployment, workspace_id: ws.name.as_str().into(), epoch_ms: finished, mode, error: None };
                    this.dispatch_lifecycle_event(&ws, event).await;
                }
                Err(e) => {
                    let reason = e.to_string();
                    if let Err(se) = this.scheduler_store.record_deploy_failure(&ws.name, finished, reason.clone()) {
                        tracing::warn!(workspace = %ws.name, error = %se, "failed to persist deploy failure");
                    }
                    this.logs.append(&ws.name, &format!("[{finished}] deploy failed: {reason}"));
                    let event = DeploymentEvent {
                        kind: EventKind::DeploymentFailed,
                        workspace_id: ws.name.as_str().into(),
                        epoch_ms: finished,
                        mode,
                        error: Some(reason),
                    };
                    this.dispatch_lifecycle_event(&ws, event).await;
                }
            }
        });
    }

    /// Dispatch a destroy (scheduled or manual).
    pub fn dispatch_destroy(self: &Arc<Self>, ws: WorkspaceConfig, now: u64) {
        if let Err(e) = self.scheduler_store.begin_destroy(&ws.name, now) {
            tracing::warn!(workspace = %ws.name, error = %e, "failed to persist begin_destroy");
        }
        self.logs.append(&ws.name, &format!("[{now}] destroy dispatched"));

        let this = Arc::clone(self);
        self.operations.lock().spawn(async move {
            let result = this.iac.destroy(&ws).await;
            let finished = this.clock.epoch_ms();
            match result {
                Ok(()) => {
                    if let Err(e) = this.scheduler_store.record_destroy_success(&ws.name, finished) {
                        tracing::warn!(workspace = %ws.name, error = %e, "failed to persist destroy success");
                    }
                    this.logs.append(&ws.name, &format!("[{finished}] destroy succeeded"));
                    let event = DeploymentEvent { kind: EventKind::Destroy, workspace_id: ws.name.as_str().into(), epoch_ms: finished, mode: None, error: None };
                    this.dispatch_lifecycle_event(&ws, event).await;
                }
                Err(e) => {
                    let reason = e.to_string();
                    if let Err(se) = this.scheduler_store.record_destroy_failure(&ws.name, finished, reason.clone()) {
                        tracing::warn!(workspace = %ws.name, error = %se, "failed to persist destroy failure");
                    }
                    this.logs.append(&ws.name, &format!("[{finished}] destroy failed: {reason}"));
                    let event = DeploymentEvent {
                        kind: EventKind::DestroyFailed,
                        workspace_id: ws.name.as_str().into(),
                        epoch_ms: finished,
                        mode: None,
                        error: Some(reason),
                    };
                    this.dispatch_lifecycle_event(&ws, event).await;
                }
            }
        });
    }

    /// After persisting a workspace's new status (spec.md §8: "After any
    /// operation, state is fully persisted before a lifecycle event is
    /// emitted"), hand the event to the job engine.
    async fn dispatch_lifecycle_event(self: &Arc<Self>, ws: &WorkspaceConfig, event: DeploymentEvent) {
        let working_dir = self.working_dir(&ws.name);
        let report = self.job_engine.run_cycle(&ws.name, &ws.jobs, CycleTrigger::Event(event), &working_dir).await;
        self.log_job_report(&ws.name, &report);
    }

    fn log_job_report(&self, workspace_id: &str, report: &cadence_jobs::CycleReport) {
        for result in &report.dispatched {
            match &result.outcome {
                Ok(outcome) if outcome.succeeded() => {
                    tracing::info!(workspace = %workspace_id, job = %result.job_name, "job succeeded")
                }
                Ok(outcome) if outcome.timed_out => {
                    tracing::warn!(workspace = %workspace_id, job = %result.job_name, "job timed out")
                }
                Ok(outcome) => {
                    tracing::warn!(workspace = %workspace_id, job = %result.job_name, exit_code = ?outcome.exit_code, "job failed")
                }
                Err(e) => tracing::warn!(workspace = %workspace_id, job = %result.job_name, error = %e, "job errored"),
            }
        }
        for blocked in &report.blocked {
            tracing::debug!(workspace = %workspace_id, job = %blocked, "job blocked on a failed dependency this cycle");
        }
    }

    /// Wait (with a cap) for in-flight operation workers to finish during
    /// graceful shutdown. Never fails: a lingering operation is simply
    /// left behind, consistent with spec.md §5's either-or shutdown
    /// contract.
    pub async fn drain_operations(&self, deadline: std::time::Duration) {
        let mut set = self.operations.lock();
        let _ = tokio::time::timeout(deadline, async {
            while set.join_next().await.is_some() {}
        })
        .await;
    }
}

/// The mode whose schedule most recently fired today, tie-broken by
/// lexicographic mode name (spec.md §4.2 step 3, §9 "Tie-break
/// determinism").
fn target_mode(modes: &BTreeMap<String, Schedule>, at: CalendarMinute) -> Option<String> {
    let mut best: Option<(CalendarMinute, &String)> = None;
    for (name, schedule) in modes {
        if let Some(fired) = last_fire_at_or_before(schedule, at) {
            let replace = match &best {
                Some((best_fired, _)) => fired > *best_fired,
                None => true,
            };
            if replace {
                best = Some((fired, name));
            }
        }
    }
    best.map(|(_, name)| name.clone())
}

fn clone_loaded(loaded: &LoadedConfig) -> LoadedConfig {
    LoadedConfig { workspaces: loaded.workspaces.clone(), standalone_jobs: loaded.standalone_jobs.clone(), errors: Vec::new() }
}

/// Diff one workspace's (or the standalone pool's) job list against its
/// previous load: reset state for any job whose declaration changed,
/// then prune state for any job no longer present.
fn reconcile_job_list(job_state: &JobStateStore, workspace: &str, old: &[JobConfig], new: &[JobConfig], now: u64) {
    for old_job in old {
        if let Some(new_job) = new.iter().find(|j| j.name == old_job.name) {
            if new_job != old_job {
                if let Err(e) = job_state.reset_for_config_change(workspace, &old_job.name, now) {
                    tracing::warn!(workspace = %workspace, job = %old_job.name, error = %e, "failed to reset job state after config change");
                }
            }
        }
    }
    let active: Vec<String> = new.iter().map(|j| j.name.clone()).collect();
    let has_stale = job_state.snapshot_workspace(workspace).into_iter().any(|(name, _)| !active.contains(&name));
    if has_stale {
        if let Err(e) = job_state.cleanup_job_states(workspace, &active, now) {
            tracing::warn!(workspace = %workspace, error = %e, "failed to clean up stale job state");
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
