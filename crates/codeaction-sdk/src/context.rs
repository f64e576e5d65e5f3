// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Read-only request data handed to an action.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use codeaction_core::Persistence;
use indexmap::IndexMap;

use crate::error::{Result, SdkError};
use crate::logger::Logger;
use crate::result::ResultSink;

/// Invocation parameters, string keys to string values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(IndexMap<String, String>);

impl Params {
    /// Build from key/value pairs, keeping their order.
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Parse a JSON object of string values. `None` or blank input is empty.
    pub fn from_json(raw: Option<&str>) -> Result<Self> {
        parse_object(raw, "params").map(Self)
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Pairs in insertion order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Request header fields. Each name maps to a list of values; the first is canonical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header(IndexMap<String, Vec<String>>);

impl Header {
    /// Build from name/values pairs, keeping their order.
    pub fn new<K>(pairs: impl IntoIterator<Item = (K, Vec<String>)>) -> Self
    where
        K: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Parse a JSON object of string arrays. `None` or blank input is empty.
    pub fn from_json(raw: Option<&str>) -> Result<Self> {
        parse_object(raw, "header").map(Self)
    }

    /// First value bound to `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> &str {
        self.0
            .get(key)
            .and_then(|values| values.first())
            .map_or("", String::as_str)
    }

    /// Every value bound to `key`.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map_or(&[], Vec::as_slice)
    }

    /// Fields in insertion order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Raw request body. Never parsed by the harness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body(String);

impl Body {
    /// Wrap a body string.
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    /// The body text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Secrets made available to the action. Values are never printed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets(BTreeMap<String, String>);

impl Secrets {
    /// Build from key/value pairs.
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Parse a JSON object of string values. `None` or blank input is empty.
    pub fn from_json(raw: Option<&str>) -> Result<Self> {
        parse_object(raw, "secrets").map(Self)
    }

    /// Secret value, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Secret value, or `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Whether a secret named `key` exists.
    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Secret names, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.keys().map(|k| (k, "***")))
            .finish()
    }
}

fn parse_object<T>(raw: Option<&str>, field: &'static str) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(json) => serde_json::from_str(json).map_err(|e| SdkError::input(field, e)),
    }
}

/// Typed inputs for one run.
#[derive(Debug, Clone, Default)]
pub struct InvocationInput {
    /// Run identifier; scopes every log entry and the result.
    pub run_id: String,
    /// Code identifier, required by some backends.
    pub code_id: Option<String>,
    /// Invocation parameters
    pub params: Params,
    /// Request header
    pub header: Header,
    /// Request body
    pub body: Body,
    /// Secrets
    pub secrets: Secrets,
}

impl InvocationInput {
    /// Input with only a run id set.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            ..Self::default()
        }
    }

    /// Set the code id.
    pub fn with_code_id(mut self, code_id: impl Into<String>) -> Self {
        self.code_id = Some(code_id.into());
        self
    }

    /// Set the parameters.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Set the header.
    pub fn with_header(mut self, header: Header) -> Self {
        self.header = header;
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Body::new(body);
        self
    }

    /// Set the secrets.
    pub fn with_secrets(mut self, secrets: Secrets) -> Self {
        self.secrets = secrets;
        self
    }
}

/// Everything an action can see and touch.
///
/// Request data is read-only; the only writable parts are [`ResultSink`] and
/// [`Logger`].
pub struct ActionContext {
    /// Invocation parameters
    pub params: Params,
    /// Request header
    pub header: Header,
    /// Request body
    pub body: Body,
    /// Secrets
    pub secrets: Secrets,
    /// Result sink, persisted on every set
    pub result: ResultSink,
    /// Log queue, persisted at flush
    pub log: Logger,
}

impl ActionContext {
    /// Build a context bound to `persistence`.
    pub fn new(input: InvocationInput, persistence: Arc<dyn Persistence>) -> Self {
        let InvocationInput {
            run_id,
            code_id,
            params,
            header,
            body,
            secrets,
        } = input;

        Self {
            params,
            header,
            body,
            secrets,
            result: ResultSink::new(run_id.clone(), persistence),
            log: Logger::new(run_id, code_id),
        }
    }

    /// Run identifier.
    pub fn run_id(&self) -> &str {
        self.log.run_id()
    }

    /// Code identifier, when given.
    pub fn code_id(&self) -> Option<&str> {
        self.log.code_id()
    }
}
