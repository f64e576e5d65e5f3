// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Command line surface of an action binary.

use clap::Parser;

use crate::context::{Body, Header, InvocationInput, Params, Secrets};
use crate::error::{Result, SdkError};

/// Flags passed by the orchestrator when it starts an action process.
#[derive(Parser, Clone)]
#[command(about = "Run a code action once and persist its result and logs")]
pub struct InvocationArgs {
    /// Run identifier
    #[arg(short = 'r', long = "run")]
    pub run: String,

    /// Code identifier
    #[arg(short = 'c', long = "codeid")]
    pub code_id: Option<String>,

    /// Parameters as a JSON object of strings
    #[arg(short = 'a', long = "arg")]
    pub arg: Option<String>,

    /// Header as a JSON object of string arrays
    #[arg(short = 'H', long = "header")]
    pub header: Option<String>,

    /// Raw request body
    #[arg(short = 'b', long = "body")]
    pub body: Option<String>,

    /// Secrets as a JSON object of strings
    #[arg(short = 's', long = "secrets", env = "CODEACTION_SECRETS", hide_env_values = true)]
    pub secrets: Option<String>,
}

impl InvocationArgs {
    /// Parse the flags into typed inputs.
    ///
    /// Identifiers and body are trimmed. Malformed JSON is an error.
    pub fn into_input(self) -> Result<InvocationInput> {
        let run_id = self.run.trim().to_string();
        if run_id.is_empty() {
            return Err(SdkError::input("run", "must not be empty"));
        }

        let code_id = self
            .code_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(InvocationInput {
            run_id,
            code_id,
            params: Params::from_json(self.arg.as_deref())?,
            header: Header::from_json(self.header.as_deref())?,
            body: Body::new(self.body.as_deref().map(str::trim).unwrap_or_default()),
            secrets: Secrets::from_json(self.secrets.as_deref())?,
        })
    }
}
