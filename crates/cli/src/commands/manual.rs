// SPDX-License-Identifier: MIT

//! `cadence deploy|destroy|mode`: manual operations forwarded to the
//! daemon over the control socket (spec.md §6).

use super::status::unexpected;
use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use cadence_wire::{Request, Response};
use std::path::Path;

pub async fn deploy(socket_path: &Path, workspace: String, mode: Option<String>) -> Result<(), ExitError> {
    let client = DaemonClient::connect(socket_path).await?;
    let response = client.send(&Request::ManualDeploy { workspace: workspace.clone(), mode }).await?;
    react(response, &workspace, "deploy dispatched")
}

pub async fn destroy(socket_path: &Path, workspace: String) -> Result<(), ExitError> {
    let client = DaemonClient::connect(socket_path).await?;
    let response = client.send(&Request::ManualDestroy { workspace: workspace.clone() }).await?;
    react(response, &workspace, "destroy dispatched")
}

pub async fn set_mode(socket_path: &Path, workspace: String, mode: String) -> Result<(), ExitError> {
    let client = DaemonClient::connect(socket_path).await?;
    let response = client.send(&Request::ManualMode { workspace: workspace.clone(), mode }).await?;
    react(response, &workspace, "mode change dispatched")
}

fn react(response: Response, workspace: &str, success_message: &str) -> Result<(), ExitError> {
    match response {
        Response::Ok => {
            println!("{workspace}: {success_message}");
            Ok(())
        }
        Response::NotFound { name } => Err(ExitError::usage(format!("unknown workspace: {name}"))),
        Response::Rejected { reason } => Err(ExitError::runtime(reason)),
        other => Err(unexpected(other)),
    }
}
