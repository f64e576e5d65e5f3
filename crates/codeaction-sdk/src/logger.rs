// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Run log queue.
//!
//! Entries are buffered in memory while the action runs and written to the
//! backend once, in creation order, when the invocation flushes. Emitting an
//! entry never performs I/O and never fails.

use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

use codeaction_core::{LogEntry, LogType, Persistence};
use tracing::{info, warn};

/// Counts from one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Entries the backend accepted.
    pub succeeded: usize,
    /// Entries the backend rejected. These are dropped, not retried.
    pub failed: usize,
}

impl FlushReport {
    /// Entries processed in total.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Ordered, in-memory queue of log entries for one run.
#[derive(Debug)]
pub struct Logger {
    run_id: String,
    code_id: Option<String>,
    queue: Mutex<Vec<LogEntry>>,
}

impl Logger {
    /// Logger bound to a run.
    pub fn new(run_id: impl Into<String>, code_id: Option<String>) -> Self {
        Self {
            run_id: run_id.into(),
            code_id,
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Run identifier stamped on every entry.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Code identifier stamped on every entry.
    pub fn code_id(&self) -> Option<&str> {
        self.code_id.as_deref()
    }

    /// Queue a `debug` entry.
    pub fn debug(&self, content: impl Into<String>) {
        self.push(LogType::Debug, content.into());
    }

    /// Queue an `info` entry.
    pub fn info(&self, content: impl Into<String>) {
        self.push(LogType::Info, content.into());
    }

    /// Queue an `error` entry.
    pub fn error(&self, content: impl Into<String>) {
        self.push(LogType::Error, content.into());
    }

    /// Snapshot of the queued entries, oldest first.
    pub fn pending(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write every queued entry, oldest first, and empty the queue.
    ///
    /// A failed write is counted and reported, then the next entry is tried.
    /// With nothing queued the backend is not called.
    pub async fn flush(&self, persistence: &dyn Persistence) -> FlushReport {
        let entries = mem::take(&mut *self.lock());
        let mut report = FlushReport::default();
        if entries.is_empty() {
            return report;
        }

        info!(run_id = %self.run_id, "Processing {} queued logs...", entries.len());

        for entry in &entries {
            match persistence.insert_log(entry).await {
                Ok(_) => report.succeeded += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        run_id = %self.run_id,
                        log_type = %entry.log_type,
                        error = %e,
                        "Failed to persist log entry"
                    );
                }
            }
        }

        info!(
            run_id = %self.run_id,
            "Log processing complete: {} successful, {} failed",
            report.succeeded,
            report.failed
        );
        report
    }

    fn push(&self, log_type: LogType, content: String) {
        let entry = LogEntry::new(self.run_id.clone(), self.code_id.clone(), log_type, content);
        self.lock().push(entry);
    }

    // A panicking action must not lose the entries queued before the panic.
    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeaction_core::persistence::MAX_LOG_CONTENT_CHARS;

    #[test]
    fn test_entries_queue_in_call_order() {
        let log = Logger::new("run-1", Some("code-1".to_string()));
        log.info("first");
        log.debug("second");
        log.error("third");

        let pending = log.pending();
        assert_eq!(pending.len(), 3);
        let kinds: Vec<LogType> = pending.iter().map(|e| e.log_type).collect();
        assert_eq!(kinds, vec![LogType::Info, LogType::Debug, LogType::Error]);
        assert!(pending.iter().all(|e| e.run_id == "run-1"));
        assert!(pending.iter().all(|e| e.code_id.as_deref() == Some("code-1")));
        assert!(pending.iter().all(|e| e.id.is_none()));
    }

    #[test]
    fn test_long_content_is_truncated_on_enqueue() {
        let log = Logger::new("run-1", None);
        log.info("y".repeat(MAX_LOG_CONTENT_CHARS * 2));
        assert_eq!(
            log.pending()[0].content.chars().count(),
            MAX_LOG_CONTENT_CHARS
        );
    }

    #[test]
    fn test_flush_report_total() {
        let report = FlushReport {
            succeeded: 3,
            failed: 2,
        };
        assert_eq!(report.total(), 5);
    }
}
