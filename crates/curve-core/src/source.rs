// File: crates/curve-core/src/source.rs
// Summary: Narrow data-access boundary (get/post JSON) and helpers that ingest through it defensively.

use std::cell::RefCell;
use std::collections::HashMap;

use log::warn;
use serde_json::{json, Value};

use crate::dataset::ReferenceDataset;
use crate::decomposition::parse_decomposition;
use crate::error::{EditorError, Result};
use crate::series::Series;

/// Request interface to whatever serves station data and stores edit results.
/// Implementations resolve fully before returning; nothing here is asynchronous.
pub trait DataSource {
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value>;
    fn post(&self, path: &str, body: &Value) -> Result<Value>;
}

/// Fetch and parse a reference dataset. Transport or shape errors yield an
/// empty dataset (logged) so a search simply finds nothing.
pub fn fetch_reference_dataset(source: &dyn DataSource, path: &str, query: &[(&str, &str)]) -> ReferenceDataset {
    match source.get(path, query) {
        Ok(v) => ReferenceDataset::from_json_lenient(&v),
        Err(e) => {
            warn!("reference dataset request '{path}' failed: {e}");
            ReferenceDataset::default()
        }
    }
}

/// Fetch a decomposition payload for `date` and turn it into series named after the date.
pub fn fetch_decomposition(source: &dyn DataSource, path: &str, date: &str) -> Result<Vec<Series>> {
    let payload = source.get(path, &[("date", date)])?;
    parse_decomposition(&payload, date)
}

/// Post `[{id, data}]` for the given series.
pub fn publish_series<'a>(source: &dyn DataSource, path: &str, series: impl IntoIterator<Item = &'a Series>) -> Result<Value> {
    let body: Vec<Value> = series
        .into_iter()
        .map(|s| json!({ "id": s.id, "data": s.data }))
        .collect();
    source.post(path, &Value::Array(body))
}

/// In-process source: canned GET responses by path, POST bodies recorded.
#[derive(Default)]
pub struct MemorySource {
    responses: HashMap<String, Value>,
    posted: RefCell<Vec<(String, Value)>>,
}

impl MemorySource {
    pub fn new() -> Self { Self::default() }

    pub fn with_response(mut self, path: impl Into<String>, value: Value) -> Self {
        self.responses.insert(path.into(), value);
        self
    }

    /// Every `(path, body)` posted so far.
    pub fn posted(&self) -> Vec<(String, Value)> { self.posted.borrow().clone() }
}

impl DataSource for MemorySource {
    fn get(&self, path: &str, _query: &[(&str, &str)]) -> Result<Value> {
        self.responses
            .get(path)
            .cloned()
            .ok_or_else(|| EditorError::Source(format!("no response for '{path}'")))
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.posted.borrow_mut().push((path.to_string(), body.clone()));
        Ok(json!({ "ok": true }))
    }
}
