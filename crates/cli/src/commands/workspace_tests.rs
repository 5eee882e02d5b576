use super::*;
use tempfile::tempdir;

fn write(path: &std::path::Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

#[test]
fn validate_reports_ok_for_well_formed_workspace() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path();
    write(&config_root.join("workspaces/app/main.tf"), "resource {}");
    write(&config_root.join("workspaces/app/config.json"), r#"{ "deploy_schedule": "0 9 * * *", "destroy_schedule": false }"#);

    assert!(validate(config_root).is_ok());
}

#[test]
fn validate_surfaces_schema_errors_without_failing_siblings() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path();
    write(&config_root.join("workspaces/good/main.tf"), "resource {}");
    write(&config_root.join("workspaces/good/config.json"), r#"{ "deploy_schedule": "0 9 * * *", "destroy_schedule": false }"#);
    write(&config_root.join("workspaces/bad/main.tf"), "resource {}");
    write(
        &config_root.join("workspaces/bad/config.json"),
        r#"{ "deploy_schedule": "0 9 * * *", "destroy_schedule": false, "mode_schedules": { "day": "0 8 * * *" } }"#,
    );

    let err = validate(config_root).unwrap_err();
    assert_eq!(err.code, 2);
}

#[test]
fn add_rejects_a_second_call_for_the_same_workspace() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path();
    let source = tmp.path().join("source.json");
    write(&source, r#"{ "deploy_schedule": "0 9 * * *", "destroy_schedule": false }"#);

    add(config_root, "app".to_string(), &source).unwrap();
    let err = add(config_root, "app".to_string(), &source).unwrap_err();
    assert_eq!(err.code, 2);
}

#[test]
fn update_requires_an_existing_workspace() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path();
    let source = tmp.path().join("source.json");
    write(&source, r#"{ "deploy_schedule": "0 9 * * *", "destroy_schedule": false }"#);

    let err = update(config_root, "ghost".to_string(), &source).unwrap_err();
    assert_eq!(err.code, 2);
}

#[test]
fn remove_deletes_the_workspace_directory() {
    let tmp = tempdir().unwrap();
    let config_root = tmp.path();
    let source = tmp.path().join("source.json");
    write(&source, r#"{ "deploy_schedule": "0 9 * * *", "destroy_schedule": false }"#);
    add(config_root, "app".to_string(), &source).unwrap();

    remove(config_root, "app".to_string()).unwrap();
    assert!(!config_root.join("workspaces/app").exists());
}
