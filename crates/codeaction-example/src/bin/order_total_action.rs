// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Order Total Action - Parses a JSON body and returns a computed summary.
//!
//! This example shows:
//! - Parsing the raw body inside the action
//! - Returning a client error status for bad input
//! - Reporting what happened to the result write
//!
//! Run with:
//! cargo run -p codeaction-example --bin order_total_action -- \
//!     -r 3f6c1c2e-0000-4000-8000-000000000002 -c totals \
//!     -b '{"lines":[{"sku":"A1","qty":2,"price":3.5}]}'

use std::process::ExitCode;

use codeaction_sdk::{Action, ActionContext, SetOutcome, async_trait};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct Order {
    lines: Vec<OrderLine>,
}

#[derive(Debug, Deserialize)]
struct OrderLine {
    sku: String,
    qty: u32,
    price: f64,
}

#[derive(Debug, Serialize)]
struct Summary {
    lines: usize,
    units: u32,
    total: f64,
}

struct OrderTotalAction;

#[async_trait]
impl Action for OrderTotalAction {
    async fn run(&self, ctx: &ActionContext) -> anyhow::Result<()> {
        let order: Order = match serde_json::from_str(ctx.body.as_str()) {
            Ok(order) => order,
            Err(e) => {
                ctx.log.error(format!("invalid order body: {e}"));
                ctx.result
                    .set_with(&format!("invalid order: {e}"), 400, "text")
                    .await;
                return Ok(());
            }
        };

        for line in &order.lines {
            ctx.log
                .debug(format!("{} x{} @ {:.2}", line.sku, line.qty, line.price));
        }

        let summary = Summary {
            lines: order.lines.len(),
            units: order.lines.iter().map(|l| l.qty).sum(),
            total: order
                .lines
                .iter()
                .map(|l| f64::from(l.qty) * l.price)
                .sum(),
        };

        match ctx.result.set_with(&summary, 200, "json").await {
            SetOutcome::Persisted { .. } => ctx.log.info("summary stored"),
            SetOutcome::RunNotFound => ctx.log.error("run record missing, summary not stored"),
            SetOutcome::Failed(e) => ctx.log.error(format!("summary not stored: {e}")),
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    codeaction_sdk::run(OrderTotalAction)
}
