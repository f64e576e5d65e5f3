// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Failing Action - Demonstrates how action failures are recorded.
//!
//! This example shows:
//! - Logs queued before a failure are still flushed
//! - A returned error becomes an `error` log entry
//! - A panic is caught the same way (pass `-a '{"mode":"panic"}'`)
//! - The process still exits 0 after teardown
//!
//! Run with:
//! cargo run -p codeaction-example --bin failing_action -- \
//!     -r 3f6c1c2e-0000-4000-8000-000000000003 -c failing

use std::process::ExitCode;

use anyhow::{Context, bail};
use codeaction_sdk::{Action, ActionContext, async_trait};

struct FailingAction;

#[async_trait]
impl Action for FailingAction {
    async fn run(&self, ctx: &ActionContext) -> anyhow::Result<()> {
        ctx.log.info("starting work that will not finish");

        match ctx.params.get("mode") {
            Some("panic") => panic!("simulated crash in user code"),
            Some("parse") => {
                let n: u32 = ctx
                    .params
                    .get("value")
                    .unwrap_or("not-a-number")
                    .parse()
                    .context("value parameter is not a number")?;
                ctx.result.set(&n).await;
                Ok(())
            }
            _ => bail!("simulated failure"),
        }
    }
}

fn main() -> ExitCode {
    codeaction_sdk::run(FailingAction)
}
