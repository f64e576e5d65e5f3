// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Invocation driver.
//!
//! One invocation walks `Init → ContextBuilt → ActionRunning → Flushing →
//! Teardown → Done`. The action runs exactly once; whatever it does, the log
//! queue is flushed and the backend is closed afterwards.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use codeaction_core::config::Config;
use codeaction_core::{Persistence, ResultRecord, persistence};
use futures::FutureExt;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::action::Action;
use crate::cli::InvocationArgs;
use crate::context::{ActionContext, InvocationInput};
use crate::error::{Result, SdkError};
use crate::logger::FlushReport;

/// Lifecycle phase of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InvocationPhase {
    /// Inputs parsed, nothing built yet
    Init,
    /// Context constructed and bound to the backend
    ContextBuilt,
    /// User action executing
    ActionRunning,
    /// Writing queued log entries
    Flushing,
    /// Releasing backend connections
    Teardown,
    /// Finished
    Done,
}

/// How the action call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Returned `Ok`
    Completed,
    /// Returned an error
    Failed(String),
    /// Panicked
    Panicked(String),
}

impl ActionOutcome {
    /// True when the action returned `Ok`.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Summary of a finished invocation.
#[derive(Debug, Clone)]
pub struct InvocationReport {
    /// How the action ended
    pub outcome: ActionOutcome,
    /// Log flush counts
    pub flush: FlushReport,
    /// Last result the action set, if any
    pub result: Option<ResultRecord>,
    /// Phases visited, in order
    pub phases: Vec<InvocationPhase>,
}

/// Drives a single action call.
pub struct Invocation {
    context: ActionContext,
    persistence: Arc<dyn Persistence>,
    phases: Vec<InvocationPhase>,
}

impl Invocation {
    /// Build the context for `input` on top of a connected backend.
    pub fn new(input: InvocationInput, persistence: Arc<dyn Persistence>) -> Self {
        let mut invocation = Self {
            context: ActionContext::new(input, persistence.clone()),
            persistence,
            phases: vec![InvocationPhase::Init],
        };
        invocation.enter(InvocationPhase::ContextBuilt);
        invocation
    }

    /// Current phase.
    pub fn phase(&self) -> InvocationPhase {
        self.phases
            .last()
            .copied()
            .unwrap_or(InvocationPhase::Init)
    }

    /// The context the action will receive.
    pub fn context(&self) -> &ActionContext {
        &self.context
    }

    /// Run the action once, then flush logs and close the backend.
    pub async fn run<A: Action + ?Sized>(mut self, action: &A) -> InvocationReport {
        self.enter(InvocationPhase::ActionRunning);
        let outcome = match AssertUnwindSafe(action.run(&self.context))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => ActionOutcome::Completed,
            Ok(Err(e)) => ActionOutcome::Failed(format!("{e:#}")),
            Err(payload) => ActionOutcome::Panicked(panic_message(payload.as_ref())),
        };

        match &outcome {
            ActionOutcome::Completed => {
                info!(run_id = %self.context.run_id(), "Action completed");
            }
            ActionOutcome::Failed(message) | ActionOutcome::Panicked(message) => {
                error!(run_id = %self.context.run_id(), "Action execution failed: {}", message);
                self.context
                    .log
                    .error(format!("Action execution failed: {message}"));
            }
        }

        self.enter(InvocationPhase::Flushing);
        let flush = self.context.log.flush(self.persistence.as_ref()).await;

        self.enter(InvocationPhase::Teardown);
        self.persistence.close().await;

        self.enter(InvocationPhase::Done);
        InvocationReport {
            outcome,
            flush,
            result: self.context.result.current(),
            phases: self.phases,
        }
    }

    fn enter(&mut self, next: InvocationPhase) {
        debug_assert!(next > self.phase(), "phases only move forward");
        debug!(run_id = %self.context.run_id(), phase = ?next, "Invocation phase");
        self.phases.push(next);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "action panicked".to_string()
    }
}

/// Reject inputs the configured backend cannot store.
pub fn check_code_id(config: &Config, input: &InvocationInput) -> Result<()> {
    if config.requires_code_id() && input.code_id.is_none() {
        return Err(SdkError::MissingCodeId {
            backend: config.backend.to_string(),
        });
    }
    Ok(())
}

/// Connect the configured backend and run one invocation.
///
/// Errors are startup faults: the action has not run.
pub async fn execute<A: Action + ?Sized>(
    input: InvocationInput,
    config: &Config,
    action: &A,
) -> Result<InvocationReport> {
    check_code_id(config, &input)?;
    let persistence = persistence::connect(config).await?;
    Ok(Invocation::new(input, persistence).run(action).await)
}

async fn start<A: Action>(args: InvocationArgs, action: &A) -> Result<InvocationReport> {
    let input = args.into_input()?;
    let config = Config::from_env()?;
    info!(run_id = %input.run_id, backend = %config.backend, "Starting action run");
    execute(input, &config, action).await
}

/// Install the process-wide tracing subscriber.
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .try_init();
}

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Process entry point for an action binary.
///
/// Exits `0` once teardown completes, whatever the action did. Startup faults
/// (bad flags, bad configuration, unreachable backend) exit `1` before the
/// action runs.
pub fn run<A: Action>(action: A) -> ExitCode {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();
    init_tracing();

    let args = match InvocationArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(start(args, &action)) {
        Ok(report) => {
            info!(
                outcome = ?report.outcome,
                logs_succeeded = report.flush.succeeded,
                logs_failed = report.flush.failed,
                "Action run finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Startup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
