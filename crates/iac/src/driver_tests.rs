// SPDX-License-Identifier: MIT

use super::*;
use crate::template::FsTemplateRegistry;
use cadence_config::WorkspaceConfig;
use tempfile::tempdir;

fn workspace(name: &str, template: Option<&str>) -> WorkspaceConfig {
    let schedule = r#"{ "deploy_schedule": "0 8 * * 1-5", "destroy_schedule": false }"#;
    let template_json = if let Some(t) = template {
        format!(r#"{{ "template": "{t}", "mode_schedules": {{ "busy": "0 8 * * 1-5" }} }}"#)
    } else {
        schedule.to_string()
    };
    WorkspaceConfig::from_json(name, &template_json).unwrap()
}

#[tokio::test]
async fn deploy_with_local_entry_succeeds() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path().join("config");
    let state_root = tmp.path().join("state");
    std::fs::create_dir_all(config_root.join("workspaces/app")).unwrap();
    std::fs::write(config_root.join("workspaces/app/main.tf"), "resource {}").unwrap();

    let registry = Arc::new(FsTemplateRegistry::new(&state_root));
    let driver = ProcessIacDriver::new("true", config_root, state_root.clone(), registry);
    let ws = workspace("app", None);

    driver.deploy(&ws, 100).await.unwrap();

    assert!(driver.working_dir("app").join("main.tf").is_file());
}

#[tokio::test]
async fn deploy_fails_when_binary_exits_nonzero() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path().join("config");
    let state_root = tmp.path().join("state");
    std::fs::create_dir_all(config_root.join("workspaces/app")).unwrap();
    std::fs::write(config_root.join("workspaces/app/main.tf"), "resource {}").unwrap();

    let registry = Arc::new(FsTemplateRegistry::new(&state_root));
    let driver = ProcessIacDriver::new("false", config_root, state_root, registry);
    let ws = workspace("app", None);

    let err = driver.deploy(&ws, 100).await.unwrap_err();
    assert!(matches!(err, IacError::CommandFailed { step: "init", .. }));
}

#[tokio::test]
async fn deploy_without_template_or_local_entry_errors() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path().join("config");
    let state_root = tmp.path().join("state");
    std::fs::create_dir_all(&config_root).unwrap();

    let registry = Arc::new(FsTemplateRegistry::new(&state_root));
    let driver = ProcessIacDriver::new("true", config_root, state_root, registry);
    let ws = workspace("ghost", None);

    let err = driver.deploy(&ws, 1).await.unwrap_err();
    assert!(matches!(err, IacError::NothingToDeploy(_)));
}

#[tokio::test]
async fn deploy_in_mode_passes_mode_var_to_apply_step() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path().join("config");
    let state_root = tmp.path().join("state");
    let templates_root = tmp.path().join("templates_src");
    std::fs::create_dir_all(templates_root.join("standard-vm")).unwrap();
    std::fs::write(templates_root.join("standard-vm/main.tf"), "resource {}").unwrap();
    std::fs::create_dir_all(state_root.join("templates/standard-vm")).unwrap();
    std::fs::write(state_root.join("templates/standard-vm/main.tf"), "resource {}").unwrap();

    let registry = Arc::new(FsTemplateRegistry::new(&state_root));
    let driver = ProcessIacDriver::new("true", config_root, state_root.clone(), registry);
    let ws = workspace("app", Some("standard-vm"));

    let out_file = tmp.path().join("mode.txt");
    let apply_override = format!("echo \"$TF_VAR_cadence_mode\" > {}", out_file.display());
    let mut ws = ws;
    ws.custom_deploy = Some(cadence_config::CustomDeployCommands { init_command: None, plan_command: None, apply_command: Some(apply_override) });

    driver.deploy_in_mode(&ws, "busy", 42).await.unwrap();

    let written = std::fs::read_to_string(&out_file).unwrap();
    assert_eq!(written.trim(), "busy");

    let metadata = metadata::read(&driver.working_dir("app"));
    assert_eq!(metadata.last_deployed_epoch_ms, Some(42));
    assert!(metadata.template_hash.is_some());
}

#[tokio::test]
async fn custom_destroy_command_overrides_default() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path().join("config");
    let state_root = tmp.path().join("state");
    std::fs::create_dir_all(config_root.join("workspaces/app")).unwrap();
    std::fs::write(config_root.join("workspaces/app/main.tf"), "resource {}").unwrap();

    let registry = Arc::new(FsTemplateRegistry::new(&state_root));
    let driver = ProcessIacDriver::new("true", config_root, state_root, registry);
    let mut ws = workspace("app", None);
    let marker = tempfile::NamedTempFile::new().unwrap();
    let marker_path = marker.path().to_path_buf();
    ws.custom_destroy = Some(cadence_config::CustomDestroyCommands { init_command: None, destroy_command: Some(format!("touch {}", marker_path.display())) });

    driver.destroy(&ws).await.unwrap();
    assert!(marker_path.is_file());
}
