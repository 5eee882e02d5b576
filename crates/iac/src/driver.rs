// SPDX-License-Identifier: MIT

//! The IaC driver abstraction (spec.md §4.5): `Deploy`/`DeployInMode`/
//! `Destroy` for workspaces, plus raw `Init`/`Plan`/`Apply`/`Destroy(dir)`
//! used directly by template-type jobs.

use crate::custom::{default_apply, default_destroy, default_init, default_plan, resolve_deploy_steps, resolve_destroy_steps};
use crate::error::IacError;
use crate::metadata::{self, ProvisionerMetadata};
use crate::process::{run_step, DEFAULT_STEP_TIMEOUT};
use crate::sync::sync_template;
use crate::template::TemplateRegistry;
use async_trait::async_trait;
use cadence_config::WorkspaceConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[async_trait]
pub trait IacDriver: Send + Sync {
    async fn deploy(&self, workspace: &WorkspaceConfig, now_epoch_ms: u64) -> Result<(), IacError>;
    async fn deploy_in_mode(&self, workspace: &WorkspaceConfig, mode: &str, now_epoch_ms: u64) -> Result<(), IacError>;
    async fn destroy(&self, workspace: &WorkspaceConfig) -> Result<(), IacError>;

    /// Raw steps used directly by `template`-type jobs, which manage their
    /// own per-job subdirectory (spec.md §4.3).
    async fn init(&self, dir: &Path) -> Result<(), IacError>;
    async fn plan(&self, dir: &Path) -> Result<(), IacError>;
    async fn apply(&self, dir: &Path) -> Result<(), IacError>;
    async fn destroy_dir(&self, dir: &Path) -> Result<(), IacError>;

    fn working_dir(&self, workspace_name: &str) -> PathBuf;
}

/// Drives `tofu`/`terraform` as a subprocess.
pub struct ProcessIacDriver {
    binary: String,
    config_root: PathBuf,
    state_root: PathBuf,
    templates: Arc<dyn TemplateRegistry>,
}

impl ProcessIacDriver {
    pub fn new(binary: impl Into<String>, config_root: PathBuf, state_root: PathBuf, templates: Arc<dyn TemplateRegistry>) -> Self {
        Self { binary: binary.into(), config_root, state_root, templates }
    }

    fn local_entry_dir(&self, workspace_name: &str) -> PathBuf {
        self.config_root.join("workspaces").join(workspace_name)
    }

    async fn resolve_source_dir(&self, workspace: &WorkspaceConfig) -> Result<PathBuf, IacError> {
        match &workspace.template {
            Some(template_name) => self
                .templates
                .source_dir(template_name)
                .await
                .ok_or_else(|| IacError::TemplateNotFound(template_name.clone())),
            None => {
                let dir = self.local_entry_dir(&workspace.name);
                if dir.is_dir() {
                    Ok(dir)
                } else {
                    Err(IacError::NothingToDeploy(workspace.name.clone()))
                }
            }
        }
    }

    async fn prepare(&self, workspace: &WorkspaceConfig) -> Result<PathBuf, IacError> {
        let working_dir = self.working_dir(&workspace.name);
        let source_dir = self.resolve_source_dir(workspace).await?;
        let working_dir_for_sync = working_dir.clone();
        tokio::task::spawn_blocking(move || sync_template(&source_dir, &working_dir_for_sync, &[]))
            .await
            .map_err(|e| IacError::Sync { dir: working_dir.display().to_string(), source: std::io::Error::new(std::io::ErrorKind::Other, e) })?
            .map_err(|source| IacError::Sync { dir: working_dir.display().to_string(), source })?;
        Ok(working_dir)
    }

    async fn run_deploy_sequence(&self, workspace: &WorkspaceConfig, working_dir: &Path, mode: Option<&str>) -> Result<(), IacError> {
        let steps = resolve_deploy_steps(&self.binary, workspace.custom_deploy.as_ref());
        let mut env = base_env(&workspace.name);
        if let Some(mode) = mode {
            env.insert("TF_VAR_cadence_mode".to_string(), mode.to_string());
        }

        run_step("init", working_dir, &steps.init, &env, DEFAULT_STEP_TIMEOUT).await?;
        run_step("plan", working_dir, &steps.plan, &env, DEFAULT_STEP_TIMEOUT).await?;
        run_step("apply", working_dir, &steps.apply, &env, DEFAULT_STEP_TIMEOUT).await?;
        Ok(())
    }

    async fn record_metadata(&self, workspace: &WorkspaceConfig, working_dir: &Path, now_epoch_ms: u64) {
        let template_hash = match &workspace.template {
            Some(name) => self.templates.content_hash(name).await,
            None => None,
        };
        let metadata = ProvisionerMetadata { template: workspace.template.clone(), template_hash, last_deployed_epoch_ms: Some(now_epoch_ms) };
        if let Err(e) = metadata::write(working_dir, &metadata) {
            tracing::warn!(workspace = %workspace.name, error = %e, "failed to write provisioner metadata");
        }
    }
}

fn base_env(workspace_name: &str) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert("WORKSPACE_ID".to_string(), workspace_name.to_string());
    env
}

#[async_trait]
impl IacDriver for ProcessIacDriver {
    async fn deploy(&self, workspace: &WorkspaceConfig, now_epoch_ms: u64) -> Result<(), IacError> {
        let working_dir = self.prepare(workspace).await?;
        self.run_deploy_sequence(workspace, &working_dir, None).await?;
        self.record_metadata(workspace, &working_dir, now_epoch_ms).await;
        Ok(())
    }

    async fn deploy_in_mode(&self, workspace: &WorkspaceConfig, mode: &str, now_epoch_ms: u64) -> Result<(), IacError> {
        let working_dir = self.prepare(workspace).await?;
        self.run_deploy_sequence(workspace, &working_dir, Some(mode)).await?;
        self.record_metadata(workspace, &working_dir, now_epoch_ms).await;
        Ok(())
    }

    async fn destroy(&self, workspace: &WorkspaceConfig) -> Result<(), IacError> {
        let working_dir = self.prepare(workspace).await?;
        let steps = resolve_destroy_steps(&self.binary, workspace.custom_destroy.as_ref());
        let env = base_env(&workspace.name);
        run_step("init", &working_dir, &steps.init, &env, DEFAULT_STEP_TIMEOUT).await?;
        run_step("destroy", &working_dir, &steps.destroy, &env, DEFAULT_STEP_TIMEOUT).await?;
        Ok(())
    }

    async fn init(&self, dir: &Path) -> Result<(), IacError> {
        run_step("init", dir, &default_init(&self.binary), &HashMap::new(), DEFAULT_STEP_TIMEOUT).await
    }

    async fn plan(&self, dir: &Path) -> Result<(), IacError> {
        run_step("plan", dir, &default_plan(&self.binary), &HashMap::new(), DEFAULT_STEP_TIMEOUT).await
    }

    async fn apply(&self, dir: &Path) -> Result<(), IacError> {
        run_step("apply", dir, &default_apply(&self.binary), &HashMap::new(), DEFAULT_STEP_TIMEOUT).await
    }

    async fn destroy_dir(&self, dir: &Path) -> Result<(), IacError> {
        run_step("destroy", dir, &default_destroy(&self.binary), &HashMap::new(), DEFAULT_STEP_TIMEOUT).await
    }

    fn working_dir(&self, workspace_name: &str) -> PathBuf {
        self.state_root.join("deployments").join(workspace_name)
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
