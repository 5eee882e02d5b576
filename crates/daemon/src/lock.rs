// SPDX-License-Identifier: MIT

//! Single-instance enforcement via an exclusive advisory lock on
//! `<state_root>/cadenced.lock`, in the style of the teacher's own
//! startup lock file: acquire the lock before touching anything else so
//! two daemons racing for the same state directory never both proceed.

use crate::error::DaemonError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Holds the lock file open for the life of the process; dropping it
/// releases the lock.
pub struct InstanceLock {
    _file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Acquire the exclusive lock at `<state_root>/cadenced.lock`, writing
    /// our PID so an operator can tell which process holds it.
    pub fn acquire(state_root: &Path) -> Result<Self, DaemonError> {
        std::fs::create_dir_all(state_root).map_err(|source| DaemonError::Io { path: state_root.display().to_string(), source })?;
        let path = state_root.join("cadenced.lock");

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| DaemonError::Io { path: path.display().to_string(), source })?;

        file.try_lock_exclusive().map_err(|_| DaemonError::AlreadyRunning(path.display().to_string()))?;

        file.set_len(0).map_err(|source| DaemonError::Io { path: path.display().to_string(), source })?;
        writeln!(file, "{}", std::process::id()).map_err(|source| DaemonError::Io { path: path.display().to_string(), source })?;

        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
