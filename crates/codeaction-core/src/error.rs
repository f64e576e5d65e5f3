// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for codeaction-core.
//!
//! Every persistence call returns a typed [`CoreError`] that the caller inspects
//! and reports; nothing in this crate swallows backend failures on its own.

use thiserror::Error;

/// Result type using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the persistence layer.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// Input validation failed.
    #[error("Validation error for '{field}': {message}")]
    ValidationError {
        /// The field that failed validation.
        field: String,
        /// The validation error message.
        message: String,
    },

    /// Relational or document database operation failed.
    #[error("Database error during '{operation}': {details}")]
    DatabaseError {
        /// The operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },

    /// Object storage operation failed.
    #[error("Object store error during '{operation}': {details}")]
    ObjectStoreError {
        /// The operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },

    /// A component needed by the operation was not configured.
    #[error("{component} is not configured")]
    NotConfigured {
        /// Human readable component name.
        component: String,
    },

    /// Encoding a record for the backend failed.
    #[error("Serialization error: {details}")]
    SerializationError {
        /// Error details.
        details: String,
    },
}

impl CoreError {
    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::DatabaseError { .. } => "DATABASE_ERROR",
            Self::ObjectStoreError { .. } => "OBJECT_STORE_ERROR",
            Self::NotConfigured { .. } => "NOT_CONFIGURED",
            Self::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }

    /// Build an [`CoreError::ObjectStoreError`] from any displayable error.
    pub fn object_store(operation: &str, err: impl std::fmt::Display) -> Self {
        Self::ObjectStoreError {
            operation: operation.to_string(),
            details: err.to_string(),
        }
    }

    /// Build a [`CoreError::DatabaseError`] from any displayable error.
    pub fn database(operation: &str, err: impl std::fmt::Display) -> Self {
        Self::DatabaseError {
            operation: operation.to_string(),
            details: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::database("query", err)
    }
}

impl From<mongodb::error::Error> for CoreError {
    fn from(err: mongodb::error::Error) -> Self {
        CoreError::database("document", err)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError {
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let test_cases = vec![
            (
                CoreError::ValidationError {
                    field: "run_id".to_string(),
                    message: "must be non-empty".to_string(),
                },
                "VALIDATION_ERROR",
            ),
            (CoreError::database("update", "connection refused"), "DATABASE_ERROR"),
            (
                CoreError::object_store("put_object", "access denied"),
                "OBJECT_STORE_ERROR",
            ),
            (
                CoreError::NotConfigured {
                    component: "object storage".to_string(),
                },
                "NOT_CONFIGURED",
            ),
            (
                CoreError::SerializationError {
                    details: "bad".to_string(),
                },
                "SERIALIZATION_ERROR",
            ),
        ];

        for (error, expected_code) in test_cases {
            assert_eq!(
                error.error_code(),
                expected_code,
                "Error {:?} should have code {}",
                error,
                expected_code
            );
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn test_error_display() {
        let err = CoreError::database("update", "connection refused");
        assert_eq!(
            err.to_string(),
            "Database error during 'update': connection refused"
        );

        let err = CoreError::object_store("put_object", "access denied");
        assert_eq!(
            err.to_string(),
            "Object store error during 'put_object': access denied"
        );

        let err = CoreError::NotConfigured {
            component: "object storage".to_string(),
        };
        assert_eq!(err.to_string(), "object storage is not configured");

        let err = CoreError::ValidationError {
            field: "run_id".to_string(),
            message: "must be non-empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Validation error for 'run_id': must be non-empty"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
