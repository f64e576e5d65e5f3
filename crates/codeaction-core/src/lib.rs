// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Codeaction Core - Run Persistence
//!
//! This crate stores what a single code action run produces: its log entries
//! and its result. A run is started by an external orchestrator, which has
//! already created the run record; the action process only appends logs and
//! overwrites the result.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────┐
//! │        Action process         │
//! │   (codeaction-sdk Invocation) │
//! └───────────────────────────────┘
//!                 │ Persistence trait
//!       ┌─────────┴──────────┬───────────────────────┐
//!       ▼                    ▼                       ▼
//! ┌──────────────┐   ┌───────────────┐   ┌──────────────────────┐
//! │ postgres-s3  │   │    mongodb    │   │   mongodb-code-id    │
//! │ results: PG  │   │ coderun       │   │ coderun              │
//! │ logs: S3     │   │ codelog       │   │ codelog (+ code_id)  │
//! └──────────────┘   └───────────────┘   └──────────────────────┘
//! ```
//!
//! # Records
//!
//! | Record | Written | Semantics |
//! |--------|---------|-----------|
//! | [`LogEntry`](persistence::LogEntry) | Once per entry, at flush | Append-only, content capped at 8000 characters |
//! | [`ResultRecord`](persistence::ResultRecord) | On every result set | Overwrites the previous value (last write wins) |
//!
//! # Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `CODEACTION_BACKEND` | No | `postgres-s3` | `postgres-s3`, `mongodb` or `mongodb-code-id` |
//! | `CODEACTION_DATABASE_URL` | For `postgres-s3` | - | PostgreSQL connection string |
//! | `CODEACTION_MONGO_URI` | No | `mongodb://localhost:27017` | MongoDB connection string |
//! | `CODEACTION_MONGO_DATABASE` | No | `code-actions` | MongoDB database |
//! | `CODEACTION_S3_ENABLED` | No | `false` | Store logs in object storage |
//! | `CODEACTION_S3_BUCKET` | When S3 enabled | - | Log bucket |
//! | `CODEACTION_S3_PREFIX` | No | `codeactions` | Object key prefix |
//! | `CODEACTION_S3_REGION` | No | `us-east-1` | Region |
//! | `CODEACTION_S3_ENDPOINT` | No | - | Custom endpoint (LocalStack, MinIO) |
//! | `CODEACTION_S3_ACCESS_KEY_ID` | No | - | Static access key |
//! | `CODEACTION_S3_SECRET_ACCESS_KEY` | No | - | Static secret key |
//!
//! # Modules
//!
//! - [`config`]: Backend selection and connection settings
//! - [`error`]: Error types with stable error codes
//! - [`migrations`]: Embedded PostgreSQL schema
//! - [`persistence`]: Records, the storage trait and its backends

#![deny(missing_docs)]

/// Configuration loaded from environment variables.
pub mod config;

/// Error types for persistence operations.
pub mod error;

/// Embedded PostgreSQL migrations.
pub mod migrations;

/// Log and result records, the storage trait and backend implementations.
pub mod persistence;

pub use config::{BackendKind, Config, ConfigError};
pub use error::CoreError;
pub use persistence::{LogEntry, LogType, Persistence, ResultRecord};
