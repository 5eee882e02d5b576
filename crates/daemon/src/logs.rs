// SPDX-License-Identifier: MIT

//! Per-workspace append-only log files.
//!
//! Spec.md §5 ("Shared resources"): "Logging is append-only; per-workspace
//! log files use a writer lock guarded behind a lazy-initialized map of
//! file handles." One append-mode `File` per workspace, opened on first
//! write and kept in a mutex-guarded map for the life of the process.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct WorkspaceLogs {
    dir: PathBuf,
    handles: Mutex<HashMap<String, File>>,
}

impl WorkspaceLogs {
    pub fn new(state_root: &Path) -> Self {
        Self { dir: state_root.join("logs"), handles: Mutex::new(HashMap::new()) }
    }

    /// Append one line to `<workspace>.log`, creating the logs directory
    /// and the file on first use. Best-effort: a write failure is logged
    /// but never propagated, since logging must not block scheduling.
    pub fn append(&self, workspace: &str, line: &str) {
        let mut handles = self.handles.lock();
        let file = match handles.get_mut(workspace) {
            Some(f) => f,
            None => {
                if let Err(e) = std::fs::create_dir_all(&self.dir) {
                    tracing::warn!(workspace = %workspace, error = %e, "failed to create logs directory");
                    return;
                }
                let path = self.dir.join(format!("{workspace}.log"));
                match OpenOptions::new().create(true).append(true).open(&path) {
                    Ok(f) => handles.entry(workspace.to_string()).or_insert(f),
                    Err(e) => {
                        tracing::warn!(workspace = %workspace, path = %path.display(), error = %e, "failed to open workspace log");
                        return;
                    }
                }
            }
        };
        if let Err(e) = writeln!(file, "{line}") {
            tracing::warn!(workspace = %workspace, error = %e, "failed to append to workspace log");
        }
    }

    /// Read the last `lines` lines of a workspace's log, or an empty
    /// string if it has never been written.
    pub fn tail(&self, workspace: &str, lines: usize) -> String {
        let path = self.dir.join(format!("{workspace}.log"));
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return String::new(),
        };
        let all: Vec<&str> = contents.lines().collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn append_then_tail_round_trips() {
        let dir = tempdir().unwrap();
        let logs = WorkspaceLogs::new(dir.path());
        logs.append("dev", "deploy dispatched");
        logs.append("dev", "deploy succeeded");
        assert_eq!(logs.tail("dev", 10), "deploy dispatched\ndeploy succeeded");
        assert_eq!(logs.tail("dev", 1), "deploy succeeded");
    }

    #[test]
    fn tail_of_unwritten_workspace_is_empty() {
        let dir = tempdir().unwrap();
        let logs = WorkspaceLogs::new(dir.path());
        assert_eq!(logs.tail("nope", 10), "");
    }
}
