// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn no_override_uses_defaults() {
    let steps = resolve_deploy_steps("tofu", None);
    assert_eq!(steps.init, "tofu init -input=false");
    assert_eq!(steps.apply, "tofu apply -input=false cadence.tfplan");
}

#[test]
fn partial_override_only_replaces_that_step() {
    let custom = CustomDeployCommands {
        init_command: None,
        plan_command: None,
        apply_command: Some("tofu apply -input=false -auto-approve -var-file=prod.tfvars".to_string()),
    };
    let steps = resolve_deploy_steps("tofu", Some(&custom));
    assert_eq!(steps.init, default_init("tofu"));
    assert_eq!(steps.plan, default_plan("tofu"));
    assert_eq!(steps.apply, "tofu apply -input=false -auto-approve -var-file=prod.tfvars");
}

#[test]
fn destroy_steps_honor_overrides() {
    let custom = CustomDestroyCommands { init_command: None, destroy_command: Some("tofu destroy -auto-approve -target=module.x".to_string()) };
    let steps = resolve_destroy_steps("tofu", Some(&custom));
    assert_eq!(steps.init, default_init("tofu"));
    assert_eq!(steps.destroy, "tofu destroy -auto-approve -target=module.x");
}
