// SPDX-License-Identifier: MIT

use super::*;

fn raw(name: &str, kind: &str, schedule: serde_json::Value, body_field: &str, body_value: &str) -> RawJob {
    let mut obj = serde_json::json!({
        "name": name,
        "type": kind,
        "schedule": schedule,
    });
    obj.as_object_mut().unwrap().insert(body_field.to_string(), serde_json::Value::String(body_value.to_string()));
    serde_json::from_value(obj).unwrap()
}

#[test]
fn parses_single_command_job() {
    let jobs = parse_jobs("app", vec![raw("build", "command", serde_json::json!("@deployment"), "command", "make build")]).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].body, JobBody::Command("make build".to_string()));
    assert_eq!(jobs[0].trigger.events, vec![EventKind::Deployment]);
    assert_eq!(jobs[0].timeout, Duration::from_secs(600));
}

#[test]
fn mixed_cron_and_event_schedule() {
    let jobs = parse_jobs(
        "app",
        vec![raw("cleanup", "script", serde_json::json!(["0 3 * * *", "@destroy"]), "script", "rm -rf /tmp/x")],
    )
    .unwrap();
    assert!(!jobs[0].trigger.cron.is_never());
    assert_eq!(jobs[0].trigger.events, vec![EventKind::Destroy]);
}

#[test]
fn rejects_job_with_no_body() {
    let raw_job: RawJob = serde_json::from_value(serde_json::json!({
        "name": "bad",
        "type": "command",
        "schedule": "@deployment",
    }))
    .unwrap();
    let err = parse_jobs("app", vec![raw_job]).unwrap_err();
    assert!(matches!(err, ConfigError::JobBodyMismatch(..)));
}

#[test]
fn rejects_duplicate_job_names() {
    let jobs = vec![
        raw("build", "command", serde_json::json!("@deployment"), "command", "make"),
        raw("build", "command", serde_json::json!("@deployment"), "command", "make again"),
    ];
    let err = parse_jobs("app", jobs).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidJobName(..)));
}

#[test]
fn rejects_unknown_dependency() {
    let mut job = raw("build", "command", serde_json::json!("@deployment"), "command", "make");
    job.depends_on = vec!["nonexistent".to_string()];
    let err = parse_jobs("app", vec![job]).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownDependency(..)));
}

#[test]
fn rejects_circular_dependency() {
    let mut a = raw("a", "command", serde_json::json!("@deployment"), "command", "echo a");
    a.depends_on = vec!["b".to_string()];
    let mut b = raw("b", "command", serde_json::json!("@deployment"), "command", "echo b");
    b.depends_on = vec!["a".to_string()];
    let err = parse_jobs("app", vec![a, b]).unwrap_err();
    assert!(matches!(err, ConfigError::CircularDependency(..)));
}
