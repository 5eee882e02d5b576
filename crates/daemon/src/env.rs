// SPDX-License-Identifier: MIT

//! Process-wide service discovery: where the state directory and config
//! root live, and the tick/log knobs the daemon reads from the
//! environment. Centralized here so every lookup goes through one place
//! and tests can override it with env vars instead of threading a config
//! struct through every call site (spec.md §9 "Global singletons").

use std::path::PathBuf;
use std::time::Duration;

/// Resolve the state directory.
///
/// Discovery order (spec.md §9): `CADENCE_STATE_DIR` override, then the
/// canonical XDG system path if `$HOME`/`$XDG_STATE_HOME` is available,
/// then a relative fallback so the daemon still runs somewhere sane in a
/// container or dev shell with neither set.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CADENCE_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("cadence");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".local/state/cadence");
    }
    PathBuf::from("./cadence-state")
}

/// Resolve the config root directory (`CADENCE_CONFIG_DIR`, defaulting to
/// `<state_dir>/../config/cadence` style layouts are left to the operator;
/// absent an explicit override we look for a `config/` directory next to
/// the state dir, which is the layout `cadence init` would produce).
pub fn config_root() -> PathBuf {
    if let Ok(dir) = std::env::var("CADENCE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".config/cadence");
    }
    PathBuf::from("./cadence-config")
}

/// The IaC binary to drive (`tofu` by default; `CADENCE_IAC_BINARY` can
/// point at a `terraform` install instead).
pub fn iac_binary() -> String {
    std::env::var("CADENCE_IAC_BINARY").unwrap_or_else(|_| "tofu".to_string())
}

/// Scheduler tick period. Spec.md §5 fixes this at "≈ 60s, configurable
/// but not exposed" as a CLI flag; we still honor an env override for
/// tests and operators who need to turn the knob without a rebuild.
pub fn tick_period() -> Duration {
    std::env::var("CADENCE_TICK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(60))
}

/// `tracing_subscriber::EnvFilter` directive, default `info`.
pub fn log_filter() -> String {
    std::env::var("CADENCE_LOG").unwrap_or_else(|_| "info".to_string())
}
