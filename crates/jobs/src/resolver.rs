// SPDX-License-Identifier: MIT

//! Pure dependency-resolution logic for one job-engine execution cycle
//! (spec.md §4.3 "Execution for an event", steps 2-7).
//!
//! This module holds no I/O and no async: it tracks which jobs have
//! completed/failed so far in the current cycle and answers "what's ready
//! to dispatch now?" The engine drives it as workers report back.

use cadence_config::JobConfig;
use std::collections::{BTreeSet, HashSet};

/// Tracks per-cycle completion state for a set of jobs and computes the
/// ready-to-dispatch set as dependencies resolve.
///
/// `completed` is seeded from each job's persisted `JobState.status`
/// (already-`success` jobs satisfy dependents even if they are not
/// themselves re-triggered this cycle); `failed` is seeded the same way
/// from `failed`/`timeout` persisted status, since a previously-failed
/// dependency still blocks a dependent until it succeeds again.
pub struct Resolver<'a> {
    jobs: &'a [JobConfig],
    completed: HashSet<String>,
    failed: HashSet<String>,
    /// Names eligible to run this cycle (passed the runnability predicate
    /// apart from their dependency check) that have not yet been
    /// dispatched or dispatched-and-finished.
    pending: BTreeSet<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(jobs: &'a [JobConfig], runnable_names: impl IntoIterator<Item = String>, completed: HashSet<String>, failed: HashSet<String>) -> Self {
        Self { jobs, completed, failed, pending: runnable_names.into_iter().collect() }
    }

    fn job(&self, name: &str) -> Option<&JobConfig> {
        self.jobs.iter().find(|j| j.name == name)
    }

    /// Is `name`'s dependency list fully satisfied (every dep in `completed`)?
    fn deps_satisfied(&self, name: &str) -> bool {
        match self.job(name) {
            Some(job) => job.depends_on.iter().all(|d| self.completed.contains(d)),
            None => true,
        }
    }

    /// Is `name` permanently blocked this cycle (a dependency has failed
    /// or timed out, transitively)?
    fn is_blocked(&self, name: &str) -> bool {
        match self.job(name) {
            Some(job) => job.depends_on.iter().any(|d| self.failed.contains(d) || self.is_blocked(d)),
            None => false,
        }
    }

    /// Pull out every still-pending job whose dependencies are satisfied,
    /// dropping blocked ones permanently (they will never become ready).
    /// Returned in job-declaration order for deterministic dispatch.
    pub fn drain_ready(&mut self) -> Vec<String> {
        let mut ready = Vec::new();
        let mut still_pending = BTreeSet::new();
        for name in std::mem::take(&mut self.pending) {
            if self.is_blocked(&name) {
                continue;
            }
            if self.deps_satisfied(&name) {
                ready.push(name);
            } else {
                still_pending.insert(name);
            }
        }
        self.pending = still_pending;
        ready.sort_by_key(|name| self.jobs.iter().position(|j| &j.name == name).unwrap_or(usize::MAX));
        ready
    }

    pub fn mark_success(&mut self, name: &str) {
        self.completed.insert(name.to_string());
    }

    pub fn mark_failed(&mut self, name: &str) {
        self.failed.insert(name.to_string());
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
