// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! SDK-specific error types.

use codeaction_core::{ConfigError, CoreError};
use thiserror::Error;

/// Errors that stop an invocation before the action runs.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Configuration error (missing or invalid environment variable)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A command line input could not be turned into a context value
    #[error("invalid input for {field}: {message}")]
    Input {
        /// Flag or field that was rejected
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// The selected backend needs a code id and none was given
    #[error("backend {backend} requires a code id (-c/--codeid)")]
    MissingCodeId {
        /// Backend name
        backend: String,
    },

    /// Backend could not be reached at startup
    #[error("persistence error: {0}")]
    Persistence(#[from] CoreError),
}

impl SdkError {
    pub(crate) fn input(field: &'static str, message: impl std::fmt::Display) -> Self {
        SdkError::Input {
            field,
            message: message.to_string(),
        }
    }
}

/// Type alias for SDK results.
pub type Result<T> = std::result::Result<T, SdkError>;
