// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! S3-compatible object storage for run logs.
//!
//! Each log entry becomes one JSON object under
//! `{prefix}/logs/{YYYY}/{MM}/{DD}/{run_id}/{code_id}/{log_id}.json`.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::{LogEntry, LogType};
use crate::config::S3Config;
use crate::error::CoreError;

/// Writes log entries as individual objects.
#[derive(Clone)]
pub struct S3LogStore {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3LogStore {
    /// Wrap an existing client.
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Build a client from configuration.
    ///
    /// Static credentials are used when both halves are configured, otherwise
    /// the default AWS provider chain applies. A custom endpoint switches the
    /// client to path-style addressing.
    pub async fn connect(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some((key, secret)) = config.static_credentials() {
            loader = loader.credentials_provider(Credentials::new(
                key,
                secret,
                None,
                None,
                "codeaction",
            ));
        }

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let shared = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.endpoint.is_some())
            .build();

        Self::new(
            Client::from_conf(s3_config),
            config.bucket.clone(),
            config.prefix.clone(),
        )
    }

    /// Bucket receiving log objects.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload one entry and return its generated id.
    pub async fn put_log(&self, entry: &LogEntry) -> Result<String, CoreError> {
        let code_id = entry
            .code_id
            .as_deref()
            .ok_or_else(|| CoreError::ValidationError {
                field: "code_id".to_string(),
                message: "object storage keys require a code id".to_string(),
            })?;

        let log_id = Uuid::new_v4().to_string();
        let key = log_object_key(
            &self.prefix,
            entry.created_at,
            &entry.run_id,
            code_id,
            &log_id,
        );
        let body = log_document(&log_id, entry)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .metadata("run-id", &entry.run_id)
            .metadata("code-id", code_id)
            .metadata("log-type", entry.log_type.as_str())
            .metadata("created-at", entry.created_at.to_rfc3339())
            .send()
            .await
            .map_err(|e| CoreError::object_store("put_object", DisplayErrorContext(e)))?;

        debug!(bucket = %self.bucket, key = %key, "Stored log object");
        Ok(log_id)
    }
}

/// Object key for a log entry.
///
/// The date path uses the UTC date of `created_at`. An empty prefix yields a
/// key starting at `logs/`.
pub fn log_object_key(
    prefix: &str,
    created_at: DateTime<Utc>,
    run_id: &str,
    code_id: &str,
    log_id: &str,
) -> String {
    let tail = format!(
        "logs/{}/{}/{}/{}.json",
        created_at.format("%Y/%m/%d"),
        run_id,
        code_id,
        log_id
    );
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        tail
    } else {
        format!("{prefix}/{tail}")
    }
}

#[derive(Serialize)]
struct LogDocument<'a> {
    id: &'a str,
    run_id: &'a str,
    code_id: Option<&'a str>,
    #[serde(rename = "type")]
    log_type: LogType,
    content: &'a str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// JSON body stored for a log entry.
fn log_document(log_id: &str, entry: &LogEntry) -> Result<Vec<u8>, CoreError> {
    let doc = LogDocument {
        id: log_id,
        run_id: &entry.run_id,
        code_id: entry.code_id.as_deref(),
        log_type: entry.log_type,
        content: &entry.content,
        created_at: entry.created_at,
        updated_at: entry.updated_at,
    };
    Ok(serde_json::to_vec(&doc)?)
}
