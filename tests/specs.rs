//! End-to-end scenario tests for the six seed scenarios in spec.md §8,
//! driven through the real stack (config loader, `Runtime`, a `"true"`
//! stand-in IaC binary, and `FakeClock`) rather than mocking any layer.
//!
//! Two additional tests exercise the `cadence` binary's process exit code
//! contract (spec.md §6: "0 on success, 1 on runtime error, 2 on argument
//! error") directly, since that contract is only observable at the
//! process boundary.

use assert_cmd::Command;
use cadence_config::load_config_root;
use cadence_core::cron::CalendarMinute;
use cadence_core::FakeClock;
use cadence_daemon::Runtime;
use cadence_iac::{FsTemplateRegistry, IacDriver, ProcessIacDriver, TemplateRegistry};
use cadence_jobs::JobEngine;
use cadence_state::{JobStateStore, SchedulerStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn write_workspace(config_root: &Path, name: &str, body: &str) {
    let dir = config_root.join("workspaces").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("main.tf"), "resource {}").unwrap();
    std::fs::write(dir.join("config.json"), body).unwrap();
}

fn build_runtime(tmp: &Path, clock: FakeClock) -> Arc<Runtime<FakeClock>> {
    let config_root = tmp.join("config");
    let state_root = tmp.join("state");
    std::fs::create_dir_all(&config_root).unwrap();
    std::fs::create_dir_all(&state_root).unwrap();

    let loaded = load_config_root(&config_root);

    let scheduler_store = Arc::new(SchedulerStore::open(&state_root));
    let job_state = Arc::new(JobStateStore::open(&state_root));
    let templates: Arc<dyn TemplateRegistry> = Arc::new(FsTemplateRegistry::new(&state_root));
    let iac: Arc<dyn IacDriver> = Arc::new(ProcessIacDriver::new("true", config_root.clone(), state_root.clone(), Arc::clone(&templates)));
    let job_engine = Arc::new(JobEngine::new(Arc::clone(&iac), Arc::clone(&templates), Arc::clone(&job_state)));
    let logs = Arc::new(cadence_daemon::WorkspaceLogs::new(&state_root));

    Arc::new(Runtime::new(config_root, state_root, loaded, scheduler_store, job_state, iac, templates, job_engine, logs, clock))
}

/// Epoch milliseconds for a `CalendarMinute`, round-tripping through the
/// host's local timezone the same way `CalendarMinute::from_epoch_ms` does
/// (mirrors the teacher's own `epoch_ms_for` test helper), so tests that
/// need a real (non-wildcard) CRON schedule aren't flaky across hosts.
fn epoch_ms_for(at: &CalendarMinute) -> u64 {
    use chrono::TimeZone;
    chrono::Local.with_ymd_and_hms(at.year, at.month, at.day, at.hour, at.minute, 0).unwrap().timestamp_millis() as u64
}

/// Scenario 1: basic deploy/destroy cycle (spec.md §8).
///
/// Wildcard schedules so the window rule fires on every tick regardless
/// of host timezone; the deploy tick and the destroy tick are separated
/// by advancing the fake clock by a full minute, since the window rule
/// only re-evaluates on a new calendar minute.
#[tokio::test]
async fn basic_deploy_then_destroy_cycle() {
    let tmp = tempdir().unwrap();
    write_workspace(&tmp.path().join("config"), "app", r#"{ "deploy_schedule": "* * * * *", "destroy_schedule": "* * * * *" }"#);
    let clock = FakeClock::at(60_000);
    let runtime = build_runtime(tmp.path(), clock.clone());

    runtime.tick().await;
    runtime.drain_operations(Duration::from_secs(5)).await;
    let after_deploy = runtime.scheduler_store.get("app");
    assert!(after_deploy.status.is_deployed(), "expected app deployed, got {:?}", after_deploy.status);

    clock.advance(60_000);
    runtime.tick().await;
    runtime.drain_operations(Duration::from_secs(5)).await;
    let after_destroy = runtime.scheduler_store.get("app");
    assert_eq!(after_destroy.status, cadence_core::WorkspaceStatus::Destroyed);
}

/// Scenario 2: mode switch (spec.md §8, §4.2 step 3).
///
/// A modal workspace deploys into whichever mode's schedule most recently
/// fired; when the clock moves into a new mode's window the next tick
/// redeploys into that mode rather than staying put.
#[tokio::test]
async fn mode_switch_redeploys_into_the_newly_targeted_mode() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path().join("config");
    let state_root = tmp.path().join("state");
    std::fs::create_dir_all(&state_root).unwrap();
    write_workspace(
        &config_root,
        "app",
        r#"{ "template": "standard", "mode_schedules": { "day": "0 8 * * *", "night": "0 20 * * *" } }"#,
    );
    let template_dir = state_root.join("templates/standard");
    std::fs::create_dir_all(&template_dir).unwrap();
    std::fs::write(template_dir.join("main.tf"), "resource {}").unwrap();

    let day = CalendarMinute { year: 2026, month: 1, day: 5, weekday: 1, hour: 8, minute: 0 };
    let clock = FakeClock::at(epoch_ms_for(&day));
    let runtime = build_runtime(tmp.path(), clock.clone());

    runtime.tick().await;
    runtime.drain_operations(Duration::from_secs(5)).await;
    let after_day = runtime.scheduler_store.get("app");
    assert_eq!(after_day.current_mode.as_deref(), Some("day"));

    let night = CalendarMinute { year: 2026, month: 1, day: 5, weekday: 1, hour: 20, minute: 0 };
    clock.set_epoch_ms(epoch_ms_for(&night));
    runtime.tick().await;
    runtime.drain_operations(Duration::from_secs(5)).await;
    let after_night = runtime.scheduler_store.get("app");
    assert_eq!(after_night.current_mode.as_deref(), Some("night"));
}

/// Scenario 3: job DAG fan-out ordering under a real deployment (spec.md
/// §8: foundation < {database, cache} < app), driven end to end through a
/// manual deploy rather than calling the job engine directly.
#[tokio::test]
async fn job_dag_fans_out_and_joins_after_a_real_deploy() {
    let tmp = tempdir().unwrap();
    let jobs = r#"[
        { "name": "foundation", "type": "command", "command": "true", "schedule": "@deployment", "enabled": true },
        { "name": "database", "type": "command", "command": "true", "schedule": "@deployment", "enabled": true, "depends_on": ["foundation"] },
        { "name": "cache", "type": "command", "command": "true", "schedule": "@deployment", "enabled": true, "depends_on": ["foundation"] },
        { "name": "app-job", "type": "command", "command": "true", "schedule": "@deployment", "enabled": true, "depends_on": ["database", "cache"] }
    ]"#;
    write_workspace(&tmp.path().join("config"), "app", &format!(r#"{{ "deploy_schedule": "* * * * *", "destroy_schedule": false, "jobs": {jobs} }}"#));
    let clock = FakeClock::at(60_000);
    let runtime = build_runtime(tmp.path(), clock);

    runtime.tick().await;
    runtime.drain_operations(Duration::from_secs(5)).await;

    for name in ["foundation", "database", "cache", "app-job"] {
        let record = runtime.job_state.get("app", name);
        assert_eq!(record.status, cadence_core::JobStatus::Success, "job {name} should have succeeded, got {:?}", record.status);
    }
}

/// Scenario 4: a circular job dependency is rejected at load time without
/// blocking sibling workspaces (spec.md §7 "Configuration errors").
#[test]
fn circular_job_dependency_is_rejected_without_blocking_siblings() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path().join("config");

    write_workspace(&config_root, "good", r#"{ "deploy_schedule": "* * * * *", "destroy_schedule": false }"#);
    let cyclic_jobs = r#"[
        { "name": "a", "type": "command", "command": "true", "schedule": "@deployment", "enabled": true, "depends_on": ["b"] },
        { "name": "b", "type": "command", "command": "true", "schedule": "@deployment", "enabled": true, "depends_on": ["a"] }
    ]"#;
    write_workspace(&config_root, "cyclic", &format!(r#"{{ "deploy_schedule": "* * * * *", "destroy_schedule": false, "jobs": {cyclic_jobs} }}"#));

    let loaded = load_config_root(&config_root);

    assert!(loaded.workspaces.contains_key("good"), "sibling workspace must still load");
    assert!(!loaded.workspaces.contains_key("cyclic"), "cyclic workspace must not load");
    assert_eq!(loaded.errors.len(), 1);
    assert!(matches!(&loaded.errors[0].1, cadence_config::ConfigError::CircularDependency(_, _)));
}

/// Scenario 5: a workspace mid-operation is not redispatched by a
/// concurrent tick (spec.md §8 invariant: at most one worker holds
/// `deploying`/`destroying` per workspace at a time).
#[tokio::test]
async fn busy_workspace_is_skipped_by_the_scheduler() {
    let tmp = tempdir().unwrap();
    write_workspace(&tmp.path().join("config"), "app", r#"{ "deploy_schedule": "* * * * *", "destroy_schedule": false }"#);
    let clock = FakeClock::at(60_000);
    let runtime = build_runtime(tmp.path(), clock);

    runtime.scheduler_store.begin_deploy("app", 1, None).unwrap();
    runtime.tick().await;
    runtime.drain_operations(Duration::from_millis(200)).await;

    let record = runtime.scheduler_store.get("app");
    assert!(record.status.is_busy(), "tick must not disturb a workspace already mid-operation");
}

/// Scenario 6: restart catch-up (spec.md §8 seed scenario 6). A
/// `0 9 * * *` deploy schedule fires at 09:00; the daemon's first tick
/// happens at 09:30 with no prior `last_deployed` — the window rule
/// catches up and deploys immediately.
#[tokio::test]
async fn restart_after_a_missed_window_catches_up_on_first_tick() {
    let tmp = tempdir().unwrap();
    write_workspace(&tmp.path().join("config"), "app", r#"{ "deploy_schedule": "0 9 * * *", "destroy_schedule": false }"#);

    let at_0930 = CalendarMinute { year: 2026, month: 1, day: 5, weekday: 1, hour: 9, minute: 30 };
    let clock = FakeClock::at(epoch_ms_for(&at_0930));
    let runtime = build_runtime(tmp.path(), clock);

    runtime.tick().await;
    runtime.drain_operations(Duration::from_secs(5)).await;

    let record = runtime.scheduler_store.get("app");
    assert!(record.status.is_deployed(), "a missed 09:00 window must still catch up by 09:30, got {:?}", record.status);
}

/// `cadence workspace validate` surfaces a schema error with exit code 2
/// (spec.md §6's argument-error contract; spec.md §9.1 names `validate`
/// explicitly).
#[test]
fn cli_validate_exits_with_code_two_on_a_schema_error() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path().join("config");
    write_workspace(
        &config_root,
        "bad",
        r#"{ "deploy_schedule": "* * * * *", "destroy_schedule": false, "mode_schedules": { "day": "0 8 * * *" } }"#,
    );

    Command::cargo_bin("cadence")
        .unwrap()
        .args(["workspace", "validate"])
        .arg(&config_root)
        .assert()
        .failure()
        .code(2);
}

/// `cadence status` against an unreachable daemon exits with code 1 (a
/// runtime error, not an argument error).
#[test]
fn cli_status_exits_with_code_one_when_daemon_is_unreachable() {
    let tmp = tempdir().unwrap();

    Command::cargo_bin("cadence")
        .unwrap()
        .env("CADENCE_STATE_DIR", tmp.path())
        .args(["status"])
        .assert()
        .failure()
        .code(1);
}
