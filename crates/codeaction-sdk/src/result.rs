// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Result sink.
//!
//! Every `set` replaces the in-memory result and writes it to the backend
//! straight away. Persistence failures are reported through tracing and the
//! returned [`SetOutcome`]; they never become action errors.

use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use codeaction_core::persistence::{DEFAULT_CONTENT_TYPE, DEFAULT_STATUS_CODE};
use codeaction_core::{CoreError, Persistence, ResultRecord};
use serde::Serialize;
use serde::ser::{self, Impossible, Serializer};
use tracing::{debug, error, warn};

/// What happened when a result was written.
#[derive(Debug, Clone)]
pub enum SetOutcome {
    /// The backend stored the result.
    Persisted {
        /// Rows or documents matched.
        rows: u64,
    },
    /// No run record matched the run id; nothing was stored.
    RunNotFound,
    /// The backend rejected the write.
    Failed(CoreError),
}

impl SetOutcome {
    /// True when the result reached the backend.
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted { .. })
    }
}

/// Holds the latest result of a run.
pub struct ResultSink {
    run_id: String,
    persistence: Arc<dyn Persistence>,
    current: Mutex<Option<ResultRecord>>,
}

impl ResultSink {
    /// Sink for `run_id` writing through `persistence`.
    pub fn new(run_id: impl Into<String>, persistence: Arc<dyn Persistence>) -> Self {
        Self {
            run_id: run_id.into(),
            persistence,
            current: Mutex::new(None),
        }
    }

    /// Set the result with status 200 and content type `text`.
    pub async fn set<T>(&self, value: &T) -> SetOutcome
    where
        T: Serialize + Debug + ?Sized,
    {
        self.set_with(value, DEFAULT_STATUS_CODE, DEFAULT_CONTENT_TYPE)
            .await
    }

    /// Set the result with explicit response metadata.
    pub async fn set_with<T>(&self, value: &T, status_code: u16, content_type: &str) -> SetOutcome
    where
        T: Serialize + Debug + ?Sized,
    {
        let record = ResultRecord {
            run_id: self.run_id.clone(),
            result: encode_result(value),
            status_code,
            content_type: content_type.to_string(),
        };
        *self.lock() = Some(record.clone());

        match self.persistence.upsert_result(&record).await {
            Ok(0) => {
                warn!(run_id = %self.run_id, "No run found for result update");
                SetOutcome::RunNotFound
            }
            Ok(rows) => {
                debug!(run_id = %self.run_id, rows, "Result persisted");
                SetOutcome::Persisted { rows }
            }
            Err(e) => {
                error!(run_id = %self.run_id, error = %e, "Failed to persist result");
                SetOutcome::Failed(e)
            }
        }
    }

    /// The last value set, whether or not it was persisted.
    pub fn current(&self) -> Option<ResultRecord> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<ResultRecord>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSink")
            .field("run_id", &self.run_id)
            .field("current", &self.current())
            .finish()
    }
}

/// Text stored for a result value.
///
/// Strings are kept verbatim, anything else is JSON. Values JSON cannot
/// represent fall back to their `Debug` form.
pub fn encode_result<T>(value: &T) -> String
where
    T: Serialize + Debug + ?Sized,
{
    if let Ok(text) = value.serialize(PlainStr) {
        return text;
    }
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

/// Accepts only a top-level `serialize_str` call.
///
/// Unit variants, chars and `Some("..")` also come out of serde_json as JSON
/// strings, but must stay quoted so they decode back.
struct PlainStr;

#[derive(Debug)]
struct NotAStr;

impl std::fmt::Display for NotAStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("value is not a string")
    }
}

impl std::error::Error for NotAStr {}

impl ser::Error for NotAStr {
    fn custom<M: std::fmt::Display>(_msg: M) -> Self {
        NotAStr
    }
}

macro_rules! reject_scalars {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<String, NotAStr> {
                Err(NotAStr)
            }
        )*
    };
}

impl Serializer for PlainStr {
    type Ok = String;
    type Error = NotAStr;
    type SerializeSeq = Impossible<String, NotAStr>;
    type SerializeTuple = Impossible<String, NotAStr>;
    type SerializeTupleStruct = Impossible<String, NotAStr>;
    type SerializeTupleVariant = Impossible<String, NotAStr>;
    type SerializeMap = Impossible<String, NotAStr>;
    type SerializeStruct = Impossible<String, NotAStr>;
    type SerializeStructVariant = Impossible<String, NotAStr>;

    fn serialize_str(self, v: &str) -> Result<String, NotAStr> {
        Ok(v.to_owned())
    }

    reject_scalars! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_bytes(&[u8]),
        serialize_unit_struct(&'static str),
    }

    fn serialize_none(self) -> Result<String, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_some<V: Serialize + ?Sized>(self, _value: &V) -> Result<String, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_unit(self) -> Result<String, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<String, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_newtype_struct<V: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _value: &V,
    ) -> Result<String, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_newtype_variant<V: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &V,
    ) -> Result<String, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, NotAStr> {
        Err(NotAStr)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, NotAStr> {
        Err(NotAStr)
    }
}
