// SPDX-License-Identifier: MIT

//! `cadenced`: the CADENCE scheduler daemon (spec.md §1, §4-§5).
//!
//! Startup sequence: acquire the single-instance lock, load config and
//! state, emit `@reboot` events, then run the tick loop and the IPC
//! listener concurrently until SIGINT/SIGTERM or a `Shutdown` request
//! cancels the shared token.

use cadence_daemon::{env, signal, DaemonError, InstanceLock, Listener, Runtime, WorkspaceLogs};
use cadence_core::SystemClock;
use cadence_iac::{FsTemplateRegistry, ProcessIacDriver, TemplateRegistry};
use cadence_jobs::JobEngine;
use cadence_state::{JobStateStore, SchedulerStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("cadenced: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), DaemonError> {
    let state_root = env::state_dir();
    let config_root = env::config_root();
    std::fs::create_dir_all(&state_root).map_err(|source| DaemonError::Io { path: state_root.display().to_string(), source })?;

    let _file_guard = init_tracing(&state_root);
    tracing::info!(state_root = %state_root.display(), config_root = %config_root.display(), "starting cadenced");

    let lock = InstanceLock::acquire(&state_root)?;
    tracing::info!(lock = %lock.path().display(), "acquired instance lock");

    let loaded = cadence_config::load_config_root(&config_root);
    for (name, err) in &loaded.errors {
        tracing::warn!(entity = %name, error = %err, "skipped invalid configuration");
    }

    let scheduler_store = Arc::new(SchedulerStore::open(&state_root));
    let job_state = Arc::new(JobStateStore::open(&state_root));
    let templates: Arc<dyn TemplateRegistry> = Arc::new(FsTemplateRegistry::new(&state_root));
    let iac = Arc::new(ProcessIacDriver::new(env::iac_binary(), config_root.clone(), state_root.clone(), Arc::clone(&templates)));
    let job_engine = Arc::new(JobEngine::new(iac.clone(), templates.clone(), Arc::clone(&job_state)));
    let logs = Arc::new(WorkspaceLogs::new(&state_root));

    let runtime = Arc::new(Runtime::new(
        config_root,
        state_root,
        loaded,
        scheduler_store,
        job_state,
        iac,
        templates,
        job_engine,
        logs,
        SystemClock,
    ));

    runtime.fire_reboot().await;

    let shutdown = CancellationToken::new();

    let listener = Listener::bind(Arc::clone(&runtime), shutdown.clone()).map_err(|source| DaemonError::BindFailed {
        path: cadence_daemon::socket_path(&runtime.state_root).display().to_string(),
        source,
    })?;
    let listener_task = tokio::spawn(listener.run());

    let signal_task = tokio::spawn(signal::wait_for_shutdown(shutdown.clone()));

    let tick_period = env::tick_period();
    let mut interval = tokio::time::interval(tick_period);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("shutdown requested, draining in-flight operations");
                break;
            }
            _ = interval.tick() => {
                runtime.tick().await;
            }
        }
    }

    runtime.drain_operations(std::time::Duration::from_secs(30)).await;
    listener_task.abort();
    signal_task.abort();
    tracing::info!("cadenced exiting");
    Ok(())
}

fn init_tracing(state_root: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(state_root, "daemon.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env::log_filter()))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    guard
}
