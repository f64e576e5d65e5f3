// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Echo Action - Returns the request it was given.
//!
//! This example shows:
//! - Reading parameters, header fields and the body
//! - Checking for a secret without exposing its value
//! - Queuing log entries
//! - Setting a structured result with explicit metadata
//!
//! Run with:
//! cargo run -p codeaction-example --bin echo_action -- \
//!     -r 3f6c1c2e-0000-4000-8000-000000000001 -c echo \
//!     -a '{"greeting":"hello"}' -H '{"Accept":["application/json"]}' -b 'ping'

use std::process::ExitCode;

use codeaction_sdk::{Action, ActionContext, async_trait};
use serde_json::json;

struct EchoAction;

#[async_trait]
impl Action for EchoAction {
    async fn run(&self, ctx: &ActionContext) -> anyhow::Result<()> {
        let greeting = ctx.params.get("greeting").unwrap_or("hi");
        ctx.log.info(format!("{greeting} from run {}", ctx.run_id()));

        if !ctx.secrets.has("API_TOKEN") {
            ctx.log.debug("no API_TOKEN secret supplied");
        }

        let params: serde_json::Map<String, serde_json::Value> = ctx
            .params
            .items()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();

        ctx.result
            .set_with(
                &json!({
                    "params": params,
                    "accept": ctx.header.get("Accept"),
                    "body": ctx.body.as_str(),
                }),
                200,
                "json",
            )
            .await;
        Ok(())
    }
}

fn main() -> ExitCode {
    codeaction_sdk::run(EchoAction)
}
