// SPDX-License-Identifier: MIT

//! `cadence logs <workspace>`

use super::status::unexpected;
use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use cadence_wire::{Request, Response};
use std::path::Path;

pub async fn handle(socket_path: &Path, workspace: String, lines: usize) -> Result<(), ExitError> {
    let client = DaemonClient::connect(socket_path).await?;
    let response = client.send(&Request::Logs { workspace: workspace.clone(), lines }).await?;

    match response {
        Response::Logs { content } => {
            if content.is_empty() {
                eprintln!("No log entries found for workspace {workspace}");
            } else {
                print!("{content}");
            }
            Ok(())
        }
        Response::NotFound { name } => Err(ExitError::usage(format!("unknown workspace: {name}"))),
        other => Err(unexpected(other)),
    }
}
