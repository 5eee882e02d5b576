// SPDX-License-Identifier: MIT

//! The IPC control socket: a Unix domain socket accepting one
//! length-prefixed [`cadence_wire::Request`] per connection and replying
//! with exactly one [`cadence_wire::Response`] (spec.md §6 "Management
//! CLIs invoke core operations ... over a local control socket").

use cadence_core::clock::Clock;
use cadence_wire::{read_request, write_response, JobSummary, Request, Response, WorkspaceSummary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;

use crate::manual;
use crate::runtime::{Runtime, STANDALONE};

/// Default tail length for `cadence logs` when the CLI doesn't specify one.
const DEFAULT_LOG_LINES: usize = 200;

pub fn socket_path(state_root: &Path) -> PathBuf {
    state_root.join("cadence.sock")
}

pub struct Listener<C: Clock> {
    runtime: Arc<Runtime<C>>,
    listener: UnixListener,
    shutdown: CancellationToken,
}

impl<C: Clock> Listener<C> {
    pub fn bind(runtime: Arc<Runtime<C>>, shutdown: CancellationToken) -> std::io::Result<Self> {
        let path = socket_path(&runtime.state_root);
        if path.exists() {
            let _ = std::fs::remove_file(&path);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let listener = UnixListener::bind(&path)?;
        Ok(Self { runtime, listener, shutdown })
    }

    /// Accept connections until shutdown is requested, spawning one task
    /// per connection so a slow CLI invocation never blocks the next one.
    pub async fn run(self) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("control socket shutting down");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            let runtime = Arc::clone(&self.runtime);
                            let shutdown = self.shutdown.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, runtime, shutdown).await {
                                    tracing::warn!(error = %e, "control connection error");
                                }
                            });
                        }
                        Err(e) => tracing::warn!(error = %e, "failed to accept control connection"),
                    }
                }
            }
        }
    }
}

async fn handle_connection<C: Clock>(mut stream: UnixStream, runtime: Arc<Runtime<C>>, shutdown: CancellationToken) -> Result<(), cadence_wire::ProtocolError> {
    let request = read_request(&mut stream).await?;
    let response = dispatch(&runtime, &shutdown, request);
    write_response(&mut stream, &response).await
}

fn dispatch<C: Clock>(runtime: &Arc<Runtime<C>>, shutdown: &CancellationToken, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong { version: env!("CARGO_PKG_VERSION").to_string() },

        Request::ManualDeploy { workspace, mode } => manual_result(manual::deploy(runtime, &workspace, mode)),
        Request::ManualDestroy { workspace } => manual_result(manual::destroy(runtime, &workspace)),
        Request::ManualMode { workspace, mode } => manual_result(manual::set_mode(runtime, &workspace, &mode)),

        Request::Status { workspace: Some(name) } => match workspace_summary(runtime, &name) {
            Some(summary) => Response::Workspaces { workspaces: vec![summary] },
            None => Response::NotFound { name },
        },
        Request::Status { workspace: None } => {
            let workspaces = runtime.workspace_names().into_iter().filter_map(|name| workspace_summary(runtime, &name)).collect();
            Response::Workspaces { workspaces }
        }

        Request::ListJobs { workspace } => Response::Jobs { jobs: job_summaries(runtime, workspace.as_deref()) },

        Request::Logs { workspace, lines } => {
            let lines = if lines == 0 { DEFAULT_LOG_LINES } else { lines };
            Response::Logs { content: runtime.logs.tail(&workspace, lines) }
        }

        Request::Shutdown => {
            shutdown.cancel();
            Response::ShuttingDown
        }
    }
}

fn manual_result(result: Result<(), manual::ManualError>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(manual::ManualError::UnknownWorkspace(name)) => Response::NotFound { name },
        Err(e) => Response::Rejected { reason: e.to_string() },
    }
}

fn workspace_summary<C: Clock>(runtime: &Arc<Runtime<C>>, name: &str) -> Option<WorkspaceSummary> {
    let ws = runtime.workspace(name)?;
    let record = runtime.scheduler_store.get(name);
    Some(WorkspaceSummary {
        name: ws.name,
        enabled: ws.enabled,
        status: record.status,
        current_mode: record.current_mode,
        last_deployed: record.last_deployed,
        last_destroyed: record.last_destroyed,
    })
}

fn job_summaries<C: Clock>(runtime: &Arc<Runtime<C>>, workspace: Option<&str>) -> Vec<JobSummary> {
    let mut out = Vec::new();
    let names: Vec<String> = match workspace {
        Some(name) => vec![name.to_string()],
        None => runtime.workspace_names().into_iter().chain(std::iter::once(STANDALONE.to_string())).collect(),
    };
    for workspace_name in names {
        for (job_name, record) in runtime.job_state.snapshot_workspace(&workspace_name) {
            out.push(JobSummary {
                workspace: workspace_name.clone(),
                name: job_name,
                status: record.status,
                last_run: record.last_run,
                last_exit_code: record.last_exit_code,
                run_count: record.run_count,
            });
        }
    }
    out
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
