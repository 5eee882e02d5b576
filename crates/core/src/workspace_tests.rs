// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn default_status_is_destroyed() {
    assert_eq!(WorkspaceStatus::default(), WorkspaceStatus::Destroyed);
}

#[test]
fn busy_statuses() {
    assert!(WorkspaceStatus::Deploying { mode: None }.is_busy());
    assert!(WorkspaceStatus::Destroying.is_busy());
    assert!(!WorkspaceStatus::Deployed { mode: None }.is_busy());
    assert!(!WorkspaceStatus::Destroyed.is_busy());
}

#[test]
fn deployed_mode_is_exposed() {
    let status = WorkspaceStatus::Deployed { mode: Some("business-hours".to_string()) };
    assert_eq!(status.mode(), Some("business-hours"));
    assert!(status.is_deployed());
}

#[test]
fn serde_round_trip_failed_variant() {
    let status = WorkspaceStatus::DeployFailed { reason: "exit code 1".to_string() };
    let json = serde_json::to_string(&status).unwrap();
    let back: WorkspaceStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(back, status);
}

#[test]
fn workspace_id_has_prefix() {
    let id = WorkspaceId::new();
    assert!(id.as_str().starts_with("wks-"));
}
