// SPDX-License-Identifier: MIT

//! `cadence`: the management CLI for a running `cadenced` daemon
//! (spec.md §6). Each subcommand is a thin wrapper — it either queries
//! daemon state over the control socket, forwards a manual operation, or
//! (for `workspace validate`/`add`/`update`/`remove`) works directly
//! against the config root on disk.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod exit_error;

use cadence_daemon::env;
use clap::{Parser, Subcommand};
use exit_error::ExitError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cadence", version, about = "Manage a running cadenced daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage workspace configuration and view live status.
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommand,
    },
    /// View job status.
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },
    /// Deploy a workspace now, bypassing its schedule.
    Deploy {
        workspace: String,
        /// Mode name, required for modal workspaces.
        mode: Option<String>,
    },
    /// Destroy a workspace now, bypassing its schedule.
    Destroy { workspace: String },
    /// Switch a modal workspace to a named mode immediately.
    Mode { workspace: String, mode: String },
    /// Show status for one workspace, or all workspaces.
    Status { workspace: Option<String> },
    /// Show log output for a workspace.
    Logs {
        workspace: String,
        /// Number of trailing lines (0 = daemon default).
        #[arg(short = 'n', long, default_value_t = 0)]
        lines: usize,
    },
}

#[derive(Subcommand)]
enum WorkspaceCommand {
    /// List all configured workspaces and their live status.
    List,
    /// Show one workspace's live status.
    Show { name: String },
    /// Register a new workspace from a `config.json` file.
    Add {
        name: String,
        #[arg(long)]
        from: PathBuf,
    },
    /// Replace an existing workspace's `config.json`.
    Update {
        name: String,
        #[arg(long)]
        from: PathBuf,
    },
    /// Remove a workspace's configuration.
    Remove { name: String },
    /// Validate the config root without starting anything.
    Validate {
        /// Defaults to the usual config root resolution (spec.md §9).
        config_root: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum JobCommand {
    /// List jobs, optionally scoped to one workspace.
    List { workspace: Option<String> },
    /// Show one job's most recent execution summary.
    Show { workspace: String, name: String },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("cadence: {e}");
            std::process::ExitCode::from(e.code as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let state_root = env::state_dir();
    let config_root = env::config_root();
    let socket_path = cadence_daemon::socket_path(&state_root);

    match cli.command {
        Command::Workspace { command } => match command {
            WorkspaceCommand::List => commands::workspace::list(&socket_path).await,
            WorkspaceCommand::Show { name } => commands::workspace::show(&socket_path, name).await,
            WorkspaceCommand::Add { name, from } => commands::workspace::add(&config_root, name, &from),
            WorkspaceCommand::Update { name, from } => commands::workspace::update(&config_root, name, &from),
            WorkspaceCommand::Remove { name } => commands::workspace::remove(&config_root, name),
            WorkspaceCommand::Validate { config_root: override_root } => commands::workspace::validate(override_root.as_deref().unwrap_or(&config_root)),
        },
        Command::Job { command } => match command {
            JobCommand::List { workspace } => commands::job::list(&socket_path, workspace).await,
            JobCommand::Show { workspace, name } => commands::job::show(&socket_path, workspace, name).await,
        },
        Command::Deploy { workspace, mode } => commands::manual::deploy(&socket_path, workspace, mode).await,
        Command::Destroy { workspace } => commands::manual::destroy(&socket_path, workspace).await,
        Command::Mode { workspace, mode } => commands::manual::set_mode(&socket_path, workspace, mode).await,
        Command::Status { workspace } => commands::status::handle(&socket_path, workspace).await,
        Command::Logs { workspace, lines } => commands::logs::handle(&socket_path, workspace, lines).await,
    }
}
