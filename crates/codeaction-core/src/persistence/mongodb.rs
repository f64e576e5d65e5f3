// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! MongoDB-backed persistence.
//!
//! Results live in the `coderun` collection and logs in `codelog`. The
//! code-id variant differs only in writing `code_id` on every log document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson, Document, doc, oid::ObjectId};
use mongodb::{Client, Database};
use tracing::debug;

use super::{LogEntry, Persistence, ResultRecord};
use crate::config::MongoConfig;
use crate::error::CoreError;

/// Collection holding one document per run.
pub const RUN_COLLECTION: &str = "coderun";
/// Collection holding one document per log entry.
pub const LOG_COLLECTION: &str = "codelog";

/// Results and logs in MongoDB.
#[derive(Clone)]
pub struct MongoPersistence {
    client: Client,
    db: Database,
}

impl MongoPersistence {
    /// Connect using the configured URI and database.
    pub async fn connect(config: &MongoConfig) -> Result<Self, CoreError> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|e| CoreError::database("connect", e))?;
        let db = client.database(&config.database);
        Ok(Self { client, db })
    }

    /// Database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl Persistence for MongoPersistence {
    async fn insert_log(&self, entry: &LogEntry) -> Result<String, CoreError> {
        insert_log(&self.db, entry, false).await
    }

    async fn upsert_result(&self, record: &ResultRecord) -> Result<u64, CoreError> {
        update_run_result(&self.db, record).await
    }

    async fn health_check(&self) -> Result<bool, CoreError> {
        health_check_db(&self.db).await
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}

/// MongoDB backend that stores the code id on every log document.
#[derive(Clone)]
pub struct MongoCodeIdPersistence {
    inner: MongoPersistence,
}

impl MongoCodeIdPersistence {
    /// Connect using the configured URI and database.
    pub async fn connect(config: &MongoConfig) -> Result<Self, CoreError> {
        Ok(Self {
            inner: MongoPersistence::connect(config).await?,
        })
    }

    /// Database handle.
    pub fn database(&self) -> &Database {
        self.inner.database()
    }
}

#[async_trait]
impl Persistence for MongoCodeIdPersistence {
    async fn insert_log(&self, entry: &LogEntry) -> Result<String, CoreError> {
        if entry.code_id.is_none() {
            return Err(CoreError::ValidationError {
                field: "code_id".to_string(),
                message: "log documents require a code id".to_string(),
            });
        }
        insert_log(&self.inner.db, entry, true).await
    }

    async fn upsert_result(&self, record: &ResultRecord) -> Result<u64, CoreError> {
        self.inner.upsert_result(record).await
    }

    async fn health_check(&self) -> Result<bool, CoreError> {
        self.inner.health_check().await
    }

    async fn close(&self) {
        self.inner.close().await;
    }
}

/// Identifier as stored in documents.
///
/// 24 hex digits become an ObjectId, anything else stays a string.
pub fn document_id(id: &str) -> Bson {
    match ObjectId::parse_str(id) {
        Ok(oid) if id.len() == 24 => Bson::ObjectId(oid),
        _ => Bson::String(id.to_string()),
    }
}

fn bson_time(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

/// Build the document stored for a log entry.
pub fn log_document(id: ObjectId, entry: &LogEntry, include_code_id: bool) -> Document {
    let mut document = doc! {
        "_id": id,
        "run_id": document_id(&entry.run_id),
        "type": entry.log_type.as_str(),
        "content": entry.content.as_str(),
        "created_at": bson_time(entry.created_at),
        "updated_at": bson_time(entry.updated_at),
    };
    if include_code_id {
        let code_id = entry.code_id.as_deref().map_or(Bson::Null, document_id);
        document.insert("code_id", code_id);
    }
    document
}

/// Build the `$set` update applied to a run document.
pub fn result_update(record: &ResultRecord, now: DateTime<Utc>) -> Document {
    doc! {
        "$set": {
            "result": record.result.as_str(),
            "extra": {
                "status_code": i32::from(record.status_code),
                "content_type": record.content_type.as_str(),
            },
            "updated_at": bson_time(now),
        }
    }
}

/// Insert one log document and return its id.
pub async fn insert_log(
    db: &Database,
    entry: &LogEntry,
    include_code_id: bool,
) -> Result<String, CoreError> {
    let id = ObjectId::new();
    db.collection::<Document>(LOG_COLLECTION)
        .insert_one(log_document(id, entry, include_code_id))
        .await
        .map_err(|e| CoreError::database("insert_log", e))?;

    debug!(log_id = %id, run_id = %entry.run_id, "Stored log document");
    Ok(id.to_hex())
}

/// Overwrite the result of a run. Returns the number of documents matched.
pub async fn update_run_result(db: &Database, record: &ResultRecord) -> Result<u64, CoreError> {
    let result = db
        .collection::<Document>(RUN_COLLECTION)
        .update_one(
            doc! { "_id": document_id(&record.run_id) },
            result_update(record, Utc::now()),
        )
        .await
        .map_err(|e| CoreError::database("update_run_result", e))?;

    Ok(result.matched_count)
}

/// Check database connectivity.
pub async fn health_check_db(db: &Database) -> Result<bool, CoreError> {
    Ok(db.run_command(doc! { "ping": 1 }).await.is_ok())
}
