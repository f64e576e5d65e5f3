// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::fmt;
use std::str::FromStr;

/// Default document store URI.
pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
/// Default document store database.
pub const DEFAULT_MONGO_DATABASE: &str = "code-actions";
/// Default object key prefix for run logs.
pub const DEFAULT_S3_PREFIX: &str = "codeactions";
/// Default object store region.
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Which persistence backend a run writes to.
///
/// Selected once at process start; never switched per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Results in PostgreSQL, log bodies in S3-compatible object storage.
    #[default]
    PostgresS3,
    /// Results and logs in MongoDB.
    MongoDb,
    /// Results and logs in MongoDB, with the code id stored on every log.
    MongoDbCodeId,
}

impl BackendKind {
    /// Stable configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostgresS3 => "postgres-s3",
            Self::MongoDb => "mongodb",
            Self::MongoDbCodeId => "mongodb-code-id",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres-s3" | "postgres" => Ok(Self::PostgresS3),
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            "mongodb-code-id" => Ok(Self::MongoDbCodeId),
            _ => Err(ConfigError::Invalid(
                "CODEACTION_BACKEND",
                "must be one of postgres-s3, mongodb, mongodb-code-id",
            )),
        }
    }
}

/// MongoDB connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    /// Connection URI
    pub uri: String,
    /// Database holding the `coderun` and `codelog` collections
    pub database: String,
}

/// S3-compatible object storage settings for run logs.
#[derive(Clone, PartialEq, Eq)]
pub struct S3Config {
    /// Bucket receiving log objects
    pub bucket: String,
    /// Key prefix prepended to every log object
    pub prefix: String,
    /// Region name
    pub region: String,
    /// Custom endpoint (LocalStack, MinIO); `None` means AWS
    pub endpoint: Option<String>,
    /// Static access key id
    pub access_key_id: Option<String>,
    /// Static secret access key
    pub secret_access_key: Option<String>,
}

impl S3Config {
    /// Static credentials, only when both halves are present.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(key), Some(secret)) => Some((key.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

/// Codeaction configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Selected persistence backend
    pub backend: BackendKind,
    /// PostgreSQL connection URL (required for `postgres-s3`)
    pub database_url: Option<String>,
    /// MongoDB settings (used by the `mongodb*` backends)
    pub mongo: MongoConfig,
    /// Object storage settings; `None` when S3 is disabled
    pub s3: Option<S3Config>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `CODEACTION_BACKEND`: `postgres-s3` (default), `mongodb`, `mongodb-code-id`
    /// - `CODEACTION_MONGO_URI`: document store URI (default: mongodb://localhost:27017)
    /// - `CODEACTION_MONGO_DATABASE`: database name (default: code-actions)
    /// - `CODEACTION_S3_ENABLED`: enable S3 log storage (default: false)
    /// - `CODEACTION_S3_PREFIX`, `CODEACTION_S3_REGION`, `CODEACTION_S3_ENDPOINT`,
    ///   `CODEACTION_S3_ACCESS_KEY_ID`, `CODEACTION_S3_SECRET_ACCESS_KEY`
    ///
    /// Conditionally required:
    /// - `CODEACTION_DATABASE_URL` when the backend is `postgres-s3`
    /// - `CODEACTION_S3_BUCKET` when S3 is enabled
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match non_empty_var("CODEACTION_BACKEND") {
            Some(raw) => raw.parse()?,
            None => BackendKind::default(),
        };

        let database_url = non_empty_var("CODEACTION_DATABASE_URL");
        if backend == BackendKind::PostgresS3 && database_url.is_none() {
            return Err(ConfigError::Missing("CODEACTION_DATABASE_URL"));
        }

        let mongo = MongoConfig {
            uri: non_empty_var("CODEACTION_MONGO_URI")
                .unwrap_or_else(|| DEFAULT_MONGO_URI.to_string()),
            database: non_empty_var("CODEACTION_MONGO_DATABASE")
                .unwrap_or_else(|| DEFAULT_MONGO_DATABASE.to_string()),
        };

        let s3_enabled = match non_empty_var("CODEACTION_S3_ENABLED") {
            Some(raw) => parse_bool(&raw)
                .ok_or(ConfigError::Invalid("CODEACTION_S3_ENABLED", "must be true or false"))?,
            None => false,
        };

        let s3 = if s3_enabled {
            let bucket = non_empty_var("CODEACTION_S3_BUCKET")
                .ok_or(ConfigError::Missing("CODEACTION_S3_BUCKET"))?;
            Some(S3Config {
                bucket,
                prefix: std::env::var("CODEACTION_S3_PREFIX")
                    .unwrap_or_else(|_| DEFAULT_S3_PREFIX.to_string()),
                region: non_empty_var("CODEACTION_S3_REGION")
                    .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
                endpoint: non_empty_var("CODEACTION_S3_ENDPOINT"),
                access_key_id: non_empty_var("CODEACTION_S3_ACCESS_KEY_ID"),
                secret_access_key: non_empty_var("CODEACTION_S3_SECRET_ACCESS_KEY"),
            })
        } else {
            None
        };

        Ok(Self {
            backend,
            database_url,
            mongo,
            s3,
        })
    }

    /// Whether runs against this configuration must carry a code id.
    ///
    /// Object keys and code-id log documents embed it.
    pub fn requires_code_id(&self) -> bool {
        match self.backend {
            BackendKind::PostgresS3 => self.s3.is_some(),
            BackendKind::MongoDb => false,
            BackendKind::MongoDbCodeId => true,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
