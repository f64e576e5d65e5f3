// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The user action entry point.

use async_trait::async_trait;

use crate::context::ActionContext;

/// A unit of user code invoked once per process.
///
/// Returning an error (or panicking) does not abort the run: the invocation
/// records the failure as an `error` log entry, then flushes and tears down
/// as usual. A result set before the failure stays persisted.
///
/// ```ignore
/// struct Greet;
///
/// #[async_trait]
/// impl Action for Greet {
///     async fn run(&self, ctx: &ActionContext) -> anyhow::Result<()> {
///         let name = ctx.params.get("name").unwrap_or("world");
///         ctx.log.info(format!("greeting {name}"));
///         ctx.result.set(&format!("hello {name}")).await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Action: Send + Sync {
    /// Execute against the run context.
    async fn run(&self, ctx: &ActionContext) -> anyhow::Result<()>;
}
