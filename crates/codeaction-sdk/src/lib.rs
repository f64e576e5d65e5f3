// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Codeaction SDK - Harness for single-shot code actions.
//!
//! An action binary is started once per run by an external orchestrator. The
//! SDK parses the command line into a read-only context, invokes the action
//! exactly once, persists its result and logs through `codeaction-core`, and
//! always tears the backend down before the process exits.
//!
//! # Quick Start
//!
//! ```ignore
//! use codeaction_sdk::{Action, ActionContext, async_trait};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Action for Echo {
//!     async fn run(&self, ctx: &ActionContext) -> anyhow::Result<()> {
//!         ctx.log.info(format!("body has {} bytes", ctx.body.as_str().len()));
//!         ctx.result.set(ctx.body.as_str()).await;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     codeaction_sdk::run(Echo)
//! }
//! ```
//!
//! # Command Line
//!
//! | Flag | Required | Description |
//! |------|----------|-------------|
//! | `-r`, `--run` | Yes | Run identifier |
//! | `-c`, `--codeid` | For `postgres-s3` with S3, and `mongodb-code-id` | Code identifier |
//! | `-a`, `--arg` | No | Parameters, JSON object of strings |
//! | `-H`, `--header` | No | Header, JSON object of string arrays |
//! | `-b`, `--body` | No | Raw body (trimmed) |
//! | `-s`, `--secrets` | No | Secrets, JSON object of strings (also `CODEACTION_SECRETS`) |
//!
//! Backend selection and connection settings come from the environment; see
//! `codeaction_core::config`.
//!
//! # Logs and Results
//!
//! - `ctx.log.debug/info/error` only queue entries. The queue is written in
//!   order after the action returns; a failed entry is counted and skipped.
//! - `ctx.result.set` writes immediately, every time. The last call wins.
//! - An action error or panic becomes an `error` entry
//!   (`Action execution failed: ...`) and never stops the flush.

#![deny(missing_docs)]

mod action;
mod cli;
mod context;
mod error;
mod logger;
mod result;
mod runner;

pub use action::Action;
pub use cli::InvocationArgs;
pub use context::{ActionContext, Body, Header, InvocationInput, Params, Secrets};
pub use error::{Result, SdkError};
pub use logger::{FlushReport, Logger};
pub use result::{ResultSink, SetOutcome, encode_result};
pub use runner::{
    ActionOutcome, Invocation, InvocationPhase, InvocationReport, check_code_id, execute,
    init_tracing, run,
};

// Re-exports so action crates need no direct dependency on these
pub use async_trait::async_trait;
pub use codeaction_core;
pub use codeaction_core::{LogEntry, LogType, Persistence, ResultRecord};
