// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn tag_round_trips_through_from_tag() {
    for kind in [
        EventKind::Deployment,
        EventKind::DeploymentFailed,
        EventKind::Destroy,
        EventKind::DestroyFailed,
        EventKind::Reboot,
    ] {
        assert_eq!(EventKind::from_tag(kind.tag()), Some(kind));
    }
}

#[test]
fn unknown_tag_is_none() {
    assert_eq!(EventKind::from_tag("@unknown"), None);
}

#[test]
fn matches_schedule_checks_tag_membership() {
    let event = DeploymentEvent {
        kind: EventKind::Deployment,
        workspace_id: crate::workspace::WorkspaceId::new(),
        epoch_ms: 0,
        mode: None,
        error: None,
    };
    assert!(event.matches_schedule(&["@deployment".to_string(), "@reboot".to_string()]));
    assert!(!event.matches_schedule(&["@destroy".to_string()]));
}
