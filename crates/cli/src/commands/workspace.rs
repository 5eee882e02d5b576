// SPDX-License-Identifier: MIT

//! `cadence workspace list|show|add|update|remove|validate`
//!
//! `list`/`show` query the running daemon for live state (spec.md §6).
//! `add`/`update`/`remove`/`validate` operate directly on the config root
//! on disk — the daemon picks up filesystem changes on its next restart
//! or hot reload, the same way the teacher's CLI edits runbook files out
//! from under a running daemon.

use super::status::unexpected;
use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use cadence_config::WorkspaceConfig;
use cadence_wire::{Request, Response, WorkspaceSummary};
use std::path::Path;

pub async fn list(socket_path: &Path) -> Result<(), ExitError> {
    let client = DaemonClient::connect(socket_path).await?;
    let response = client.send(&Request::Status { workspace: None }).await?;
    match response {
        Response::Workspaces { workspaces } => {
            if workspaces.is_empty() {
                println!("No workspaces configured");
            }
            for ws in &workspaces {
                print_row(&ws);
            }
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

pub async fn show(socket_path: &Path, name: String) -> Result<(), ExitError> {
    let client = DaemonClient::connect(socket_path).await?;
    let response = client.send(&Request::Status { workspace: Some(name.clone()) }).await?;
    match response {
        Response::Workspaces { workspaces } => match workspaces.into_iter().next() {
            Some(ws) => {
                print_row(&ws);
                Ok(())
            }
            None => Err(ExitError::usage(format!("unknown workspace: {name}"))),
        },
        Response::NotFound { name } => Err(ExitError::usage(format!("unknown workspace: {name}"))),
        other => Err(unexpected(other)),
    }
}

/// Validate (and register) a `config.json` for `name`, copying `from` into
/// `<config_root>/workspaces/<name>/config.json`. `overwrite` controls
/// whether an existing workspace directory may be replaced (`add` passes
/// `false`, `update` passes `true`).
fn write_config(config_root: &Path, name: &str, from: &Path, overwrite: bool) -> Result<(), ExitError> {
    let raw_json = std::fs::read_to_string(from).map_err(|e| ExitError::usage(format!("cannot read {}: {e}", from.display())))?;
    WorkspaceConfig::from_json(name, &raw_json).map_err(|e| ExitError::usage(format!("invalid workspace config: {e}")))?;

    let dir = config_root.join("workspaces").join(name);
    if dir.exists() && !overwrite {
        return Err(ExitError::usage(format!("workspace {name} already exists (use `update` to replace it)")));
    }
    if !dir.exists() && overwrite {
        return Err(ExitError::usage(format!("workspace {name} does not exist (use `add` to create it)")));
    }
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("config.json"), raw_json)?;
    println!("{name}: configuration written; restart or reload cadenced to pick it up");
    Ok(())
}

pub fn add(config_root: &Path, name: String, from: &Path) -> Result<(), ExitError> {
    write_config(config_root, &name, from, false)
}

pub fn update(config_root: &Path, name: String, from: &Path) -> Result<(), ExitError> {
    write_config(config_root, &name, from, true)
}

pub fn remove(config_root: &Path, name: String) -> Result<(), ExitError> {
    let dir = config_root.join("workspaces").join(&name);
    if !dir.exists() {
        return Err(ExitError::usage(format!("unknown workspace: {name}")));
    }
    std::fs::remove_dir_all(&dir)?;
    println!("{name}: removed; restart or reload cadenced to pick it up");
    Ok(())
}

/// Load `config_root` the same way the daemon would and report any
/// per-entity errors, without starting anything (spec.md §9.1).
pub fn validate(config_root: &Path) -> Result<(), ExitError> {
    let loaded = cadence_config::load_config_root(config_root);
    for name in loaded.workspaces.keys() {
        println!("{name}: ok");
    }
    for name in loaded.standalone_jobs.keys() {
        println!("job {name}: ok");
    }
    if loaded.errors.is_empty() {
        Ok(())
    } else {
        for (name, err) in &loaded.errors {
            eprintln!("{name}: {err}");
        }
        Err(ExitError::new(2, format!("{} configuration error(s)", loaded.errors.len())))
    }
}

fn print_row(ws: &WorkspaceSummary) {
    let mode = ws.current_mode.as_deref().unwrap_or("-");
    println!("{:<20} {:<10} {:<18} mode={}", ws.name, if ws.enabled { "enabled" } else { "disabled" }, ws.status, mode);
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
