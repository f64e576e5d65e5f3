// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for codeaction-sdk tests.
//!
//! Provides an in-memory `Persistence` that records every call and can be told
//! to fail selected writes.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use codeaction_sdk::codeaction_core::CoreError;
use codeaction_sdk::{LogEntry, Persistence, ResultRecord};
use tokio::sync::Mutex;

/// Recording backend.
#[derive(Default)]
pub struct MockPersistence {
    logs: Mutex<Vec<LogEntry>>,
    results: Mutex<Vec<ResultRecord>>,
    log_calls: AtomicUsize,
    result_calls: AtomicUsize,
    close_calls: AtomicUsize,
    /// Zero-based `insert_log` call indices that fail.
    fail_log_calls: HashSet<usize>,
    fail_results: bool,
    /// When set, only these run ids match on result updates.
    known_runs: Option<HashSet<String>>,
}

impl MockPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_logs(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            fail_log_calls: indices.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn failing_results() -> Self {
        Self {
            fail_results: true,
            ..Self::default()
        }
    }

    pub fn with_known_runs<S: Into<String>>(runs: impl IntoIterator<Item = S>) -> Self {
        Self {
            known_runs: Some(runs.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Entries the backend accepted, in write order.
    pub async fn stored_logs(&self) -> Vec<LogEntry> {
        self.logs.lock().await.clone()
    }

    /// Results the backend accepted, in write order.
    pub async fn stored_results(&self) -> Vec<ResultRecord> {
        self.results.lock().await.clone()
    }

    pub fn log_calls(&self) -> usize {
        self.log_calls.load(Ordering::SeqCst)
    }

    pub fn result_calls(&self) -> usize {
        self.result_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Persistence for MockPersistence {
    async fn insert_log(&self, entry: &LogEntry) -> Result<String, CoreError> {
        let call = self.log_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_log_calls.contains(&call) {
            return Err(CoreError::database("insert_log", "injected failure"));
        }
        let id = format!("log-{call}");
        let mut stored = entry.clone();
        stored.id = Some(id.clone());
        self.logs.lock().await.push(stored);
        Ok(id)
    }

    async fn upsert_result(&self, record: &ResultRecord) -> Result<u64, CoreError> {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_results {
            return Err(CoreError::database("upsert_result", "injected failure"));
        }
        if let Some(known) = &self.known_runs {
            if !known.contains(&record.run_id) {
                return Ok(0);
            }
        }
        self.results.lock().await.push(record.clone());
        Ok(1)
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Coerce a shared mock into the trait object the SDK takes.
pub fn as_backend(mock: &Arc<MockPersistence>) -> Arc<dyn Persistence> {
    mock.clone()
}
