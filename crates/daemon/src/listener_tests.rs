use super::*;
use crate::logs::WorkspaceLogs;
use cadence_config::load_config_root;
use cadence_core::FakeClock;
use cadence_iac::{FsTemplateRegistry, ProcessIacDriver};
use cadence_jobs::JobEngine;
use cadence_state::{JobStateStore, SchedulerStore};
use tempfile::tempdir;

fn build_runtime(tmp: &std::path::Path) -> Arc<Runtime<FakeClock>> {
    let config_root = tmp.join("config");
    let state_root = tmp.join("state");
    let dir = config_root.join("workspaces/app");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("main.tf"), "resource {}").unwrap();
    std::fs::write(dir.join("config.json"), r#"{ "deploy_schedule": "* * * * *", "destroy_schedule": false }"#).unwrap();

    let loaded = load_config_root(&config_root);
    assert!(loaded.errors.is_empty());

    let scheduler_store = Arc::new(SchedulerStore::open(&state_root));
    let job_state = Arc::new(JobStateStore::open(&state_root));
    let templates: Arc<dyn cadence_iac::TemplateRegistry> = Arc::new(FsTemplateRegistry::new(&state_root));
    let iac: Arc<dyn cadence_iac::IacDriver> = Arc::new(ProcessIacDriver::new("true", config_root.clone(), state_root.clone(), Arc::clone(&templates)));
    let job_engine = Arc::new(JobEngine::new(Arc::clone(&iac), Arc::clone(&templates), Arc::clone(&job_state)));
    let logs = Arc::new(WorkspaceLogs::new(&state_root));

    Arc::new(Runtime::new(config_root, state_root, loaded, scheduler_store, job_state, iac, templates, job_engine, logs, FakeClock::at(1_000)))
}

#[test]
fn ping_gets_pong() {
    let tmp = tempdir().unwrap();
    let runtime = build_runtime(tmp.path());
    let shutdown = CancellationToken::new();

    let response = dispatch(&runtime, &shutdown, Request::Ping);
    assert!(matches!(response, Response::Pong { .. }));
}

#[test]
fn status_for_unknown_workspace_is_not_found() {
    let tmp = tempdir().unwrap();
    let runtime = build_runtime(tmp.path());
    let shutdown = CancellationToken::new();

    let response = dispatch(&runtime, &shutdown, Request::Status { workspace: Some("ghost".to_string()) });
    assert_eq!(response, Response::NotFound { name: "ghost".to_string() });
}

#[test]
fn status_for_known_workspace_reports_its_record() {
    let tmp = tempdir().unwrap();
    let runtime = build_runtime(tmp.path());
    let shutdown = CancellationToken::new();

    let response = dispatch(&runtime, &shutdown, Request::Status { workspace: Some("app".to_string()) });
    match response {
        Response::Workspaces { workspaces } => {
            assert_eq!(workspaces.len(), 1);
            assert_eq!(workspaces[0].name, "app");
            assert_eq!(workspaces[0].status, cadence_core::WorkspaceStatus::Destroyed);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn shutdown_request_cancels_the_token() {
    let tmp = tempdir().unwrap();
    let runtime = build_runtime(tmp.path());
    let shutdown = CancellationToken::new();

    let response = dispatch(&runtime, &shutdown, Request::Shutdown);
    assert_eq!(response, Response::ShuttingDown);
    assert!(shutdown.is_cancelled());
}

#[test]
fn manual_deploy_on_unknown_workspace_is_not_found() {
    let tmp = tempdir().unwrap();
    let runtime = build_runtime(tmp.path());
    let shutdown = CancellationToken::new();

    let response = dispatch(&runtime, &shutdown, Request::ManualDeploy { workspace: "ghost".to_string(), mode: None });
    assert_eq!(response, Response::NotFound { name: "ghost".to_string() });
}

#[tokio::test]
async fn logs_request_returns_tail_of_workspace_log() {
    let tmp = tempdir().unwrap();
    let runtime = build_runtime(tmp.path());
    let shutdown = CancellationToken::new();
    runtime.logs.append("app", "hello");

    let response = dispatch(&runtime, &shutdown, Request::Logs { workspace: "app".to_string(), lines: 10 });
    assert_eq!(response, Response::Logs { content: "hello".to_string() });
}
