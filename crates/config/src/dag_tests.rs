// SPDX-License-Identifier: MIT

use super::*;
use crate::job::test_job;

#[test]
fn linear_chain_is_acyclic() {
    let jobs = vec![test_job("a", &[]), test_job("b", &["a"]), test_job("c", &["b"])];
    assert_eq!(detect_cycle(&jobs), None);
}

#[test]
fn diamond_fan_out_is_acyclic() {
    let jobs = vec![
        test_job("foundation", &[]),
        test_job("database", &["foundation"]),
        test_job("cache", &["foundation"]),
        test_job("app", &["database", "cache"]),
    ];
    assert_eq!(detect_cycle(&jobs), None);
}

#[test]
fn direct_cycle_is_detected() {
    let jobs = vec![test_job("a", &["b"]), test_job("b", &["a"])];
    assert!(detect_cycle(&jobs).is_some());
}

#[test]
fn self_dependency_is_detected() {
    let jobs = vec![test_job("a", &["a"])];
    assert_eq!(detect_cycle(&jobs), Some("a".to_string()));
}

#[test]
fn longer_cycle_is_detected() {
    let jobs = vec![test_job("a", &["b"]), test_job("b", &["c"]), test_job("c", &["a"])];
    assert!(detect_cycle(&jobs).is_some());
}
