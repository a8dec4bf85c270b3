use chrono::NaiveDateTime;
use exectime_job::error::{PipelineError, ValidationError};
use exectime_job::merger::{merge, merge_snapshot};
use exectime_job::record::{Record, WindowStats};
use serde_json::json;

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn rec(s: &str, value: f64) -> Record {
    Record::new(at(s), "etl", value)
}

#[test]
fn test_merge_drops_incoming_with_stored_timestamp() {
    let stats = WindowStats {
        baseline: 11.0,
        std_dev: 1.0,
        upper_bound: 12.5,
        lower_bound: 9.5,
    };
    let existing = vec![
        rec("2024-03-01 08:00:00", 10.0),
        rec("2024-03-01 09:00:00", 12.0).with_stats(Some(stats)),
    ];
    let incoming = vec![
        // Same timestamp, different payload: still dropped.
        Record::new(at("2024-03-01 09:00:00"), "other", 99.0),
        rec("2024-03-01 10:00:00", 50.0),
    ];

    let merged = merge(existing.clone(), incoming);
    assert_eq!(merged.len(), 3);
    assert_eq!(&merged[..2], &existing[..]);
    assert_eq!(merged[2], rec("2024-03-01 10:00:00", 50.0));
}

#[test]
fn test_merge_keeps_incoming_duplicates_and_order() {
    let existing = vec![rec("2024-03-01 12:00:00", 10.0)];
    let incoming = vec![
        rec("2024-03-01 11:00:00", 1.0),
        rec("2024-03-01 10:00:00", 2.0),
        rec("2024-03-01 10:00:00", 3.0),
    ];

    let merged = merge(existing, incoming);
    let values: Vec<f64> = merged.iter().map(|r| r.execution_time).collect();
    assert_eq!(values, vec![10.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_merge_is_idempotent_against_prior_state() {
    let existing = vec![rec("2024-03-01 08:00:00", 10.0)];
    let incoming = vec![rec("2024-03-01 09:00:00", 12.0), rec("2024-03-01 10:00:00", 14.0)];

    let once = merge(existing, incoming.clone());
    let twice = merge(once.clone(), incoming);
    assert_eq!(once, twice);
}

#[test]
fn test_merge_with_empty_sides() {
    let records = vec![rec("2024-03-01 08:00:00", 10.0)];
    assert_eq!(merge(Vec::new(), records.clone()), records);
    assert_eq!(merge(records.clone(), Vec::new()), records);
}

#[test]
fn test_merge_snapshot_normalizes_timestamps() {
    let existing = vec![rec("2024-03-01 08:00:00", 10.0)];
    let items = vec![
        json!({"Datetime": "2024-03-01T10:00:00+02:00", "ProcessName": "etl", "ExecutionTime": 11.0}),
        json!({"Datetime": "2024-03-01T09:00:00", "ProcessName": "etl", "ExecutionTime": 12.0}),
    ];

    let merged = merge_snapshot(existing, &items).unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[1], rec("2024-03-01 09:00:00", 12.0));
}

#[test]
fn test_merge_snapshot_fails_without_partial_merge() {
    let existing = vec![rec("2024-03-01 08:00:00", 10.0)];
    let items = vec![
        json!({"Datetime": "2024-03-01T09:00:00", "ProcessName": "etl", "ExecutionTime": 12.0}),
        json!({"Datetime": "2024-03-01T10:00:00", "ExecutionTime": 13.0}),
    ];

    let err = merge_snapshot(existing, &items).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::MissingField { index: 1, field: "ProcessName" })
    ));
}
