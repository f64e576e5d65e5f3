// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PostgreSQL result storage paired with object-store logs.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{LogEntry, Persistence, ResultRecord, S3LogStore};
use crate::error::CoreError;

/// Results in the `coderuns` table, log bodies in object storage.
#[derive(Clone)]
pub struct PostgresS3Persistence {
    pool: PgPool,
    logs: Option<S3LogStore>,
}

impl PostgresS3Persistence {
    /// Create the backend. `logs` is `None` when object storage is disabled.
    pub fn new(pool: PgPool, logs: Option<S3LogStore>) -> Self {
        Self { pool, logs }
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Overwrite the result and response metadata of a run.
///
/// Returns the number of rows updated; zero when the run does not exist.
pub async fn update_run_result(pool: &PgPool, record: &ResultRecord) -> Result<u64, CoreError> {
    let result = sqlx::query(
        r#"
        UPDATE coderuns
        SET result = $1,
            extra = $2::jsonb,
            updated_at = NOW()
        WHERE id::text = $3
        "#,
    )
    .bind(&record.result)
    .bind(record.extra())
    .bind(&record.run_id)
    .execute(pool)
    .await
    .map_err(|e| CoreError::database("update_run_result", e))?;

    Ok(result.rows_affected())
}

/// Check database connectivity.
pub async fn health_check_db(pool: &PgPool) -> Result<bool, CoreError> {
    let result: Result<(i32,), _> = sqlx::query_as("SELECT 1").fetch_one(pool).await;
    Ok(result.is_ok())
}

#[async_trait]
impl Persistence for PostgresS3Persistence {
    async fn insert_log(&self, entry: &LogEntry) -> Result<String, CoreError> {
        match &self.logs {
            Some(store) => store.put_log(entry).await,
            None => Err(CoreError::NotConfigured {
                component: "object storage".to_string(),
            }),
        }
    }

    async fn upsert_result(&self, record: &ResultRecord) -> Result<u64, CoreError> {
        update_run_result(&self.pool, record).await
    }

    async fn health_check(&self) -> Result<bool, CoreError> {
        health_check_db(&self.pool).await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
