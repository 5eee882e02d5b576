// SPDX-License-Identifier: MIT

//! `cadence job list|show [workspace]`

use super::status::unexpected;
use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use cadence_wire::{JobSummary, Request, Response};
use std::path::Path;

pub async fn list(socket_path: &Path, workspace: Option<String>) -> Result<(), ExitError> {
    let client = DaemonClient::connect(socket_path).await?;
    let response = client.send(&Request::ListJobs { workspace }).await?;

    match response {
        Response::Jobs { jobs } => {
            if jobs.is_empty() {
                println!("No jobs found");
                return Ok(());
            }
            for job in &jobs {
                print_row(&job);
            }
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

pub async fn show(socket_path: &Path, workspace: String, name: String) -> Result<(), ExitError> {
    let client = DaemonClient::connect(socket_path).await?;
    let response = client.send(&Request::ListJobs { workspace: Some(workspace.clone()) }).await?;

    match response {
        Response::Jobs { jobs } => match jobs.into_iter().find(|j| j.name == name) {
            Some(job) => {
                print_row(&job);
                Ok(())
            }
            None => Err(ExitError::usage(format!("no job named {name} in workspace {workspace}"))),
        },
        other => Err(unexpected(other)),
    }
}

fn print_row(job: &JobSummary) {
    let last_run = job.last_run.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
    let exit_code = job.last_exit_code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
    println!(
        "{:<20} {:<20} {:<10?} runs={:<5} last_run={:<14} exit={}",
        job.workspace, job.name, job.status, job.run_count, last_run, exit_code
    );
}
