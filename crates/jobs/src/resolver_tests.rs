// SPDX-License-Identifier: MIT

use super::*;
use cadence_config::test_job;
use std::collections::HashSet;

#[test]
fn independent_jobs_are_all_ready_immediately() {
    let jobs = vec![test_job("a", &[]), test_job("b", &[])];
    let mut r = Resolver::new(&jobs, vec!["a".to_string(), "b".to_string()], HashSet::new(), HashSet::new());
    let mut ready = r.drain_ready();
    ready.sort();
    assert_eq!(ready, vec!["a", "b"]);
    assert!(r.is_done());
}

#[test]
fn dependent_job_waits_for_its_dependency() {
    let jobs = vec![test_job("foundation", &[]), test_job("database", &["foundation"])];
    let mut r = Resolver::new(&jobs, vec!["foundation".to_string(), "database".to_string()], HashSet::new(), HashSet::new());

    let ready = r.drain_ready();
    assert_eq!(ready, vec!["foundation"]);
    assert!(!r.is_done());

    // database isn't ready yet: foundation hasn't reported success.
    assert!(r.drain_ready().is_empty());

    r.mark_success("foundation");
    let ready = r.drain_ready();
    assert_eq!(ready, vec!["database"]);
    assert!(r.is_done());
}

#[test]
fn fan_out_then_join_ordering() {
    // foundation < {database, cache} < app
    let jobs = vec![
        test_job("foundation", &[]),
        test_job("database", &["foundation"]),
        test_job("cache", &["foundation"]),
        test_job("app", &["database", "cache"]),
    ];
    let mut r = Resolver::new(
        &jobs,
        vec!["foundation".to_string(), "database".to_string(), "cache".to_string(), "app".to_string()],
        HashSet::new(),
        HashSet::new(),
    );

    assert_eq!(r.drain_ready(), vec!["foundation"]);
    r.mark_success("foundation");

    let mut ready = r.drain_ready();
    ready.sort();
    assert_eq!(ready, vec!["cache", "database"]);
    assert!(r.drain_ready().is_empty(), "app must not be ready before both deps succeed");

    r.mark_success("database");
    assert!(r.drain_ready().is_empty(), "app must not be ready with only one of two deps done");

    r.mark_success("cache");
    assert_eq!(r.drain_ready(), vec!["app"]);
    assert!(r.is_done());
}

#[test]
fn failed_dependency_permanently_blocks_dependent_this_cycle() {
    let jobs = vec![test_job("a", &[]), test_job("b", &["a"])];
    let mut r = Resolver::new(&jobs, vec!["a".to_string(), "b".to_string()], HashSet::new(), HashSet::new());

    assert_eq!(r.drain_ready(), vec!["a"]);
    r.mark_failed("a");

    // b is dropped, never becomes ready, but the cycle still terminates.
    assert!(r.drain_ready().is_empty());
    assert!(r.is_done());
}

#[test]
fn transitively_blocked_dependent_is_also_dropped() {
    let jobs = vec![test_job("a", &[]), test_job("b", &["a"]), test_job("c", &["b"])];
    let mut r = Resolver::new(&jobs, vec!["a".to_string(), "b".to_string(), "c".to_string()], HashSet::new(), HashSet::new());

    assert_eq!(r.drain_ready(), vec!["a"]);
    r.mark_failed("a");
    assert!(r.drain_ready().is_empty());
    assert!(r.is_done());
}

#[test]
fn dependency_already_successful_from_a_prior_cycle_unblocks_immediately() {
    // `foundation` isn't in this cycle's runnable set at all (e.g. it's
    // event-triggered and this cycle is a CRON tick), but its persisted
    // state already shows success, so `database` is ready right away.
    let jobs = vec![test_job("foundation", &[]), test_job("database", &["foundation"])];
    let mut completed = HashSet::new();
    completed.insert("foundation".to_string());
    let mut r = Resolver::new(&jobs, vec!["database".to_string()], completed, HashSet::new());

    assert_eq!(r.drain_ready(), vec!["database"]);
    assert!(r.is_done());
}

#[test]
fn dependency_already_failed_from_a_prior_cycle_blocks_immediately() {
    let jobs = vec![test_job("foundation", &[]), test_job("database", &["foundation"])];
    let mut failed = HashSet::new();
    failed.insert("foundation".to_string());
    let mut r = Resolver::new(&jobs, vec!["database".to_string()], HashSet::new(), failed);

    assert!(r.drain_ready().is_empty());
    assert!(r.is_done());
}
