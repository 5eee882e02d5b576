// SPDX-License-Identifier: MIT

//! Resolves a workspace's effective init/plan/apply/destroy command lines,
//! substituting `custom_deploy`/`custom_destroy` overrides for individual
//! default steps (spec.md §4.5).

use cadence_config::{CustomDeployCommands, CustomDestroyCommands};

pub fn default_init(binary: &str) -> String {
    format!("{binary} init -input=false")
}

pub fn default_plan(binary: &str) -> String {
    format!("{binary} plan -input=false -out=cadence.tfplan")
}

pub fn default_apply(binary: &str) -> String {
    format!("{binary} apply -input=false cadence.tfplan")
}

pub fn default_destroy(binary: &str) -> String {
    format!("{binary} destroy -input=false -auto-approve")
}

/// The three shell command lines a deploy runs, after custom overrides.
pub struct DeploySteps {
    pub init: String,
    pub plan: String,
    pub apply: String,
}

pub fn resolve_deploy_steps(binary: &str, custom: Option<&CustomDeployCommands>) -> DeploySteps {
    let custom = custom.cloned_or_default();
    DeploySteps {
        init: non_blank(custom.init_command).unwrap_or_else(|| default_init(binary)),
        plan: non_blank(custom.plan_command).unwrap_or_else(|| default_plan(binary)),
        apply: non_blank(custom.apply_command).unwrap_or_else(|| default_apply(binary)),
    }
}

/// The two shell command lines a destroy runs, after custom overrides.
pub struct DestroySteps {
    pub init: String,
    pub destroy: String,
}

pub fn resolve_destroy_steps(binary: &str, custom: Option<&CustomDestroyCommands>) -> DestroySteps {
    let custom = custom.cloned_or_default();
    DestroySteps {
        init: non_blank(custom.init_command).unwrap_or_else(|| default_init(binary)),
        destroy: non_blank(custom.destroy_command).unwrap_or_else(|| default_destroy(binary)),
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

trait ClonedOrDefault<T> {
    fn cloned_or_default(self) -> T;
}

impl<T: Default + Clone> ClonedOrDefault<T> for Option<&T> {
    fn cloned_or_default(self) -> T {
        self.cloned().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "custom_tests.rs"]
mod tests;
