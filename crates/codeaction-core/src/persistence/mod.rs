// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Persistence interfaces and backends for codeaction-core.
//!
//! A run writes two kinds of records: log entries (appended one at a time when
//! the SDK flushes its queue) and the run result (one row or document per run,
//! created by the orchestrator and updated here). Three backends implement the
//! same [`Persistence`] trait; which one a process uses is decided once from
//! [`Config::backend`].

pub mod mongodb;
pub mod postgres;
pub mod s3;

pub use self::mongodb::{MongoCodeIdPersistence, MongoPersistence};
pub use self::postgres::PostgresS3Persistence;
pub use self::s3::S3LogStore;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::{BackendKind, Config};
use crate::error::CoreError;

/// Upper bound on log content, counted in characters.
pub const MAX_LOG_CONTENT_CHARS: usize = 8000;

/// How long startup waits for the relational database.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Status code stored with a result when the action does not pick one.
pub const DEFAULT_STATUS_CODE: u16 = 200;

/// Content type stored with a result when the action does not pick one.
pub const DEFAULT_CONTENT_TYPE: &str = "text";

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    /// Verbose diagnostics.
    Debug,
    /// Normal progress messages.
    Info,
    /// Failures, including the one recorded when the action itself fails.
    Error,
}

impl LogType {
    /// Lowercase name as stored by every backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single log line produced by an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Identifier assigned by the backend; `None` until persisted.
    pub id: Option<String>,
    /// Run the entry belongs to.
    pub run_id: String,
    /// Code the run executes, when known.
    pub code_id: Option<String>,
    /// Severity.
    pub log_type: LogType,
    /// Message text, at most [`MAX_LOG_CONTENT_CHARS`] characters.
    pub content: String,
    /// When the entry was produced.
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at`; entries are never edited.
    pub updated_at: DateTime<Utc>,
}

impl LogEntry {
    /// Build an entry stamped with the current time.
    pub fn new(
        run_id: impl Into<String>,
        code_id: Option<String>,
        log_type: LogType,
        content: impl Into<String>,
    ) -> Self {
        Self::with_created_at(run_id, code_id, log_type, content, Utc::now())
    }

    /// Build an entry with an explicit creation time.
    pub fn with_created_at(
        run_id: impl Into<String>,
        code_id: Option<String>,
        log_type: LogType,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            run_id: run_id.into(),
            code_id,
            log_type,
            content: truncate_chars(content.into(), MAX_LOG_CONTENT_CHARS),
            created_at,
            updated_at: created_at,
        }
    }
}

fn truncate_chars(mut content: String, max: usize) -> String {
    if let Some((byte_idx, _)) = content.char_indices().nth(max) {
        content.truncate(byte_idx);
    }
    content
}

/// The outcome value of a run together with its response metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// Run the result belongs to.
    pub run_id: String,
    /// Encoded result text.
    pub result: String,
    /// Response status code reported to the caller.
    pub status_code: u16,
    /// Response content type reported to the caller.
    pub content_type: String,
}

impl ResultRecord {
    /// Build a record with the default status code and content type.
    pub fn new(run_id: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            result: result.into(),
            status_code: DEFAULT_STATUS_CODE,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Metadata object stored next to the result.
    pub fn extra(&self) -> serde_json::Value {
        serde_json::json!({
            "status_code": self.status_code,
            "content_type": self.content_type,
        })
    }
}

/// Storage interface shared by every backend.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Append one log entry and return the identifier it was stored under.
    async fn insert_log(&self, entry: &LogEntry) -> Result<String, CoreError>;

    /// Overwrite the stored result of a run.
    ///
    /// Returns the number of rows or documents matched. Zero means the run
    /// does not exist; that is not an error at this layer.
    async fn upsert_result(&self, record: &ResultRecord) -> Result<u64, CoreError>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<bool, CoreError> {
        Ok(true)
    }

    /// Release connections. Called once, after the final flush.
    async fn close(&self) {}
}

/// Build the configured backend and verify that it is reachable.
pub async fn connect(config: &Config) -> Result<Arc<dyn Persistence>, CoreError> {
    let persistence: Arc<dyn Persistence> = match config.backend {
        BackendKind::PostgresS3 => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| CoreError::NotConfigured {
                    component: "database url".to_string(),
                })?;
            let pool = PgPoolOptions::new()
                .max_connections(2)
                .acquire_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
                .connect(url)
                .await
                .map_err(|e| CoreError::database("connect", e))?;
            let logs = match &config.s3 {
                Some(s3) => Some(S3LogStore::connect(s3).await),
                None => None,
            };
            Arc::new(PostgresS3Persistence::new(pool, logs))
        }
        BackendKind::MongoDb => Arc::new(MongoPersistence::connect(&config.mongo).await?),
        BackendKind::MongoDbCodeId => {
            Arc::new(MongoCodeIdPersistence::connect(&config.mongo).await?)
        }
    };

    if !persistence.health_check().await? {
        persistence.close().await;
        return Err(CoreError::database(
            "health_check",
            format!("{} backend is unreachable", config.backend),
        ));
    }

    info!(backend = %config.backend, "Persistence backend connected");
    Ok(persistence)
}
