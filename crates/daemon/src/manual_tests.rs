use super::*;
use crate::logs::WorkspaceLogs;
use cadence_config::load_config_root;
use cadence_core::FakeClock;
use cadence_iac::{FsTemplateRegistry, IacDriver, ProcessIacDriver};
use cadence_jobs::JobEngine;
use cadence_state::{JobStateStore, SchedulerStore};
use std::time::Duration;
use tempfile::tempdir;

fn write_modal_workspace(config_root: &std::path::Path, state_root: &std::path::Path, name: &str, template: &str) {
    let dir = config_root.join("workspaces").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.json"),
        format!(r#"{{ "template": "{template}", "mode_schedules": {{ "day": "0 8 * * *", "night": "0 20 * * *" }} }}"#),
    )
    .unwrap();
    let template_dir = state_root.join("templates").join(template);
    std::fs::create_dir_all(&template_dir).unwrap();
    std::fs::write(template_dir.join("main.tf"), "resource {}").unwrap();
}

fn build_runtime(tmp: &std::path::Path) -> Arc<Runtime<FakeClock>> {
    let config_root = tmp.join("config");
    let state_root = tmp.join("state");
    std::fs::create_dir_all(&config_root).unwrap();
    std::fs::create_dir_all(&state_root).unwrap();
    write_modal_workspace(&config_root, &state_root, "app", "standard-vm");

    let loaded = load_config_root(&config_root);
    assert!(loaded.errors.is_empty(), "unexpected config errors: {:?}", loaded.errors);

    let scheduler_store = Arc::new(SchedulerStore::open(&state_root));
    let job_state = Arc::new(JobStateStore::open(&state_root));
    let templates: Arc<dyn cadence_iac::TemplateRegistry> = Arc::new(FsTemplateRegistry::new(&state_root));
    let iac: Arc<dyn IacDriver> = Arc::new(ProcessIacDriver::new("true", config_root.clone(), state_root.clone(), Arc::clone(&templates)));
    let job_engine = Arc::new(JobEngine::new(Arc::clone(&iac), Arc::clone(&templates), Arc::clone(&job_state)));
    let logs = Arc::new(WorkspaceLogs::new(&state_root));

    Arc::new(Runtime::new(config_root, state_root, loaded, scheduler_store, job_state, iac, templates, job_engine, logs, FakeClock::at(1_000)))
}

#[tokio::test]
async fn manual_deploy_in_unknown_mode_is_rejected() {
    let tmp = tempdir().unwrap();
    let runtime = build_runtime(tmp.path());

    let err = deploy(&runtime, "app", Some("weekend".to_string())).unwrap_err();
    assert!(matches!(err, ManualError::UnknownMode { .. }));
}

#[tokio::test]
async fn manual_deploy_on_unknown_workspace_is_rejected() {
    let tmp = tempdir().unwrap();
    let runtime = build_runtime(tmp.path());

    let err = deploy(&runtime, "ghost", None).unwrap_err();
    assert!(matches!(err, ManualError::UnknownWorkspace(_)));
}

#[tokio::test]
async fn manual_deploy_in_valid_mode_dispatches_and_records_current_mode() {
    let tmp = tempdir().unwrap();
    let runtime = build_runtime(tmp.path());

    deploy(&runtime, "app", Some("day".to_string())).unwrap();
    runtime.drain_operations(Duration::from_secs(5)).await;

    let record = runtime.scheduler_store.get("app");
    assert_eq!(record.current_mode.as_deref(), Some("day"));
}

#[tokio::test]
async fn manual_operation_is_rejected_while_busy() {
    let tmp = tempdir().unwrap();
    let runtime = build_runtime(tmp.path());

    runtime.scheduler_store.begin_deploy("app", 1, Some("day".to_string())).unwrap();
    let err = deploy(&runtime, "app", Some("night".to_string())).unwrap_err();
    assert!(matches!(err, ManualError::Busy(_)));
}

#[tokio::test]
async fn set_mode_is_equivalent_to_a_mode_deploy() {
    let tmp = tempdir().unwrap();
    let runtime = build_runtime(tmp.path());

    set_mode(&runtime, "app", "night").unwrap();
    runtime.drain_operations(Duration::from_secs(5)).await;

    let record = runtime.scheduler_store.get("app");
    assert_eq!(record.current_mode.as_deref(), Some("night"));
}
