// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for codeaction-core backend tests.
//!
//! Live tests read `TEST_DATABASE_URL` and `TEST_MONGO_URI` and skip when the
//! variable they need is unset.

#![allow(dead_code)]

use codeaction_core::config::{BackendKind, Config, MongoConfig};
use sqlx::PgPool;
use uuid::Uuid;

/// Config for a backend with everything else left at defaults.
pub fn config_for(backend: BackendKind) -> Config {
    Config {
        backend,
        database_url: None,
        mongo: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "code-actions".to_string(),
        },
        s3: None,
    }
}

/// Config pointing at the test PostgreSQL database, S3 disabled.
pub fn postgres_config() -> Option<Config> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let mut config = config_for(BackendKind::PostgresS3);
    config.database_url = Some(url);
    Some(config)
}

/// Config pointing at a fresh database on the test MongoDB server.
pub fn mongo_config(backend: BackendKind) -> Option<Config> {
    let uri = std::env::var("TEST_MONGO_URI").ok()?;
    let mut config = config_for(backend);
    config.mongo = MongoConfig {
        uri,
        database: format!("codeaction_test_{}", Uuid::new_v4().simple()),
    };
    Some(config)
}

/// Pool with migrations applied, for seeding and inspecting rows.
pub async fn seeded_pool(url: &str) -> Option<PgPool> {
    let pool = PgPool::connect(url).await.ok()?;
    codeaction_core::migrations::run_postgres(&pool).await.ok()?;
    Some(pool)
}

/// Insert a run row as the orchestrator would.
pub async fn create_test_run(pool: &PgPool, code_id: &str) -> Uuid {
    let run_id = Uuid::new_v4();
    sqlx::query("INSERT INTO coderuns (id, code_id, status) VALUES ($1, $2, 'running')")
        .bind(run_id)
        .bind(code_id)
        .execute(pool)
        .await
        .expect("Failed to create test run");
    run_id
}

macro_rules! skip_if_no_db {
    () => {
        if std::env::var("TEST_DATABASE_URL").is_err() {
            eprintln!("Skipping test: TEST_DATABASE_URL not set");
            return;
        }
    };
}

macro_rules! skip_if_no_mongo {
    () => {
        if std::env::var("TEST_MONGO_URI").is_err() {
            eprintln!("Skipping test: TEST_MONGO_URI not set");
            return;
        }
    };
}
