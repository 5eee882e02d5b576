// SPDX-License-Identifier: MIT

//! SIGINT/SIGTERM handling: either signal requests graceful shutdown
//! (spec.md §5 "persists state, closes logs, exits") via a shared
//! [`CancellationToken`] rather than exiting from inside the signal
//! handler itself.

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Wait for SIGINT or SIGTERM, then cancel `token`. Runs until either a
/// signal arrives or `token` is cancelled by some other path (e.g. the
/// control socket's `Shutdown` request), so the task always resolves.
pub async fn wait_for_shutdown(token: CancellationToken) {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGTERM handler");
            token.cancelled().await;
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGINT handler");
            token.cancelled().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        _ = sigint.recv() => tracing::info!("received SIGINT"),
        _ = token.cancelled() => return,
    }
    token.cancel();
}
