// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Result sink persistence tests.

mod common;

use std::collections::BTreeMap;

use codeaction_sdk::{ResultSink, SetOutcome};
use common::*;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, serde::Deserialize)]
struct Order {
    id: u32,
    items: Vec<String>,
    total: f64,
}

#[tokio::test]
async fn test_set_twice_last_write_wins() {
    let mock = MockPersistence::new().shared();
    let sink = ResultSink::new("run-1", as_backend(&mock));

    assert!(sink.set("first").await.is_persisted());
    assert!(sink.set_with("second", 202, "html").await.is_persisted());

    let stored = mock.stored_results().await;
    assert_eq!(stored.len(), 2);
    let last = stored.last().unwrap();
    assert_eq!(last.result, "second");
    assert_eq!(last.status_code, 202);
    assert_eq!(last.content_type, "html");
    assert_eq!(sink.current().unwrap(), *last);
}

#[tokio::test]
async fn test_defaults_are_200_text() {
    let mock = MockPersistence::new().shared();
    let sink = ResultSink::new("run-1", as_backend(&mock));

    sink.set("ok").await;

    let results = mock.stored_results().await;
    let stored = &results[0];
    assert_eq!(stored.status_code, 200);
    assert_eq!(stored.content_type, "text");
    assert_eq!(
        stored.extra(),
        serde_json::json!({"status_code": 200, "content_type": "text"})
    );
}

#[tokio::test]
async fn test_structured_value_round_trips_through_json() {
    let mock = MockPersistence::new().shared();
    let sink = ResultSink::new("run-1", as_backend(&mock));
    let order = Order {
        id: 7,
        items: vec!["apple".to_string(), "pear".to_string()],
        total: 12.5,
    };

    sink.set(&order).await;

    let results = mock.stored_results().await;
    let stored = &results[0];
    let decoded: Order = serde_json::from_str(&stored.result).unwrap();
    assert_eq!(decoded, order);
}

#[tokio::test]
async fn test_unserializable_value_persists_fallback_string() {
    let mock = MockPersistence::new().shared();
    let sink = ResultSink::new("run-1", as_backend(&mock));
    let mut grid = BTreeMap::new();
    grid.insert((0u8, 1u8), 9u8);

    let outcome = sink.set(&grid).await;

    assert!(outcome.is_persisted());
    assert_eq!(mock.stored_results().await[0].result, "{(0, 1): 9}");
}

#[tokio::test]
async fn test_unknown_run_is_reported_not_raised() {
    let mock = MockPersistence::with_known_runs(["other-run"]).shared();
    let sink = ResultSink::new("run-1", as_backend(&mock));

    let outcome = sink.set("lost").await;

    assert!(matches!(outcome, SetOutcome::RunNotFound));
    assert!(mock.stored_results().await.is_empty());
    assert_eq!(sink.current().unwrap().result, "lost");
}

#[tokio::test]
async fn test_backend_failure_keeps_in_memory_value() {
    let mock = MockPersistence::failing_results().shared();
    let sink = ResultSink::new("run-1", as_backend(&mock));

    let outcome = sink.set(&serde_json::json!([1, 2, 3])).await;

    match outcome {
        SetOutcome::Failed(e) => assert_eq!(e.error_code(), "DATABASE_ERROR"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(sink.current().unwrap().result, "[1,2,3]");
    assert_eq!(mock.result_calls(), 1);
}
