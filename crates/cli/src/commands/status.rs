// SPDX-License-Identifier: MIT

//! `cadence status [workspace]`

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use cadence_wire::{Request, Response};
use std::path::Path;

pub async fn handle(socket_path: &Path, workspace: Option<String>) -> Result<(), ExitError> {
    let client = DaemonClient::connect(socket_path).await?;
    let response = client.send(&Request::Status { workspace: workspace.clone() }).await?;

    match response {
        Response::Workspaces { workspaces } => {
            if workspaces.is_empty() {
                println!("No workspaces configured");
                return Ok(());
            }
            for ws in &workspaces {
                let mode = ws.current_mode.as_deref().unwrap_or("-");
                println!("{:<20} {:<10} {:<18} mode={}", ws.name, if ws.enabled { "enabled" } else { "disabled" }, ws.status, mode);
            }
            Ok(())
        }
        Response::NotFound { name } => Err(ExitError::usage(format!("unknown workspace: {name}"))),
        other => Err(unexpected(other)),
    }
}

pub(crate) fn unexpected(response: Response) -> ExitError {
    match response {
        Response::Error { message } => ExitError::runtime(message),
        Response::Rejected { reason } => ExitError::runtime(reason),
        other => ExitError::runtime(format!("unexpected daemon response: {other:?}")),
    }
}
