// SPDX-License-Identifier: MIT

//! Three-color DFS cycle detection over a workspace's job dependency graph.

use crate::job::JobConfig;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Returns the name of a job participating in a cycle, if the `depends_on`
/// graph over `jobs` is not acyclic.
pub fn detect_cycle(jobs: &[JobConfig]) -> Option<String> {
    let index: HashMap<&str, &JobConfig> = jobs.iter().map(|j| (j.name.as_str(), j)).collect();
    let mut color: HashMap<&str, Color> = jobs.iter().map(|j| (j.name.as_str(), Color::White)).collect();

    for job in jobs {
        if color.get(job.name.as_str()) == Some(&Color::White) {
            if let Some(cycle_member) = visit(&job.name, &index, &mut color) {
                return Some(cycle_member);
            }
        }
    }
    None
}

fn visit<'a>(name: &'a str, index: &HashMap<&'a str, &'a JobConfig>, color: &mut HashMap<&'a str, Color>) -> Option<String> {
    match color.get(name) {
        Some(Color::Black) => return None,
        Some(Color::Gray) => return Some(name.to_string()),
        _ => {}
    }
    color.insert(name, Color::Gray);
    if let Some(job) = index.get(name) {
        for dep in &job.depends_on {
            if let Some(cycle_member) = visit(dep, index, color) {
                return Some(cycle_member);
            }
        }
    }
    color.insert(name, Color::Black);
    None
}

#[cfg(test)]
#[path = "dag_tests.rs"]
mod tests;
