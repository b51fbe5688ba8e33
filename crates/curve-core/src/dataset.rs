// File: crates/curve-core/src/dataset.rs
// Summary: Multi-user reference dataset: timestamp parsing, defensive JSON ingestion, day grouping.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EditorError, Result};
use crate::grid::sort_by_time;
use crate::series::Sample;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// A timestamp split into its calendar day (when present) and hour of day.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedTimestamp {
    /// `YYYY-MM-DD`, or `None` for bare times.
    pub day_key: Option<String>,
    /// Fractional hours since midnight, in [0, 24).
    pub hour_of_day: f64,
}

fn hours_of(t: NaiveTime) -> f64 {
    t.hour() as f64 + t.minute() as f64 / 60.0 + (t.second() as f64 + t.nanosecond() as f64 * 1e-9) / 3600.0
}

/// Parse `YYYY-MM-DD HH:MM:SS` (also `T`-separated) or a bare `HH:MM:SS`.
pub fn parse_timestamp(s: &str) -> Result<ParsedTimestamp> {
    let s = s.trim();
    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ParsedTimestamp {
                day_key: Some(dt.date().format("%Y-%m-%d").to_string()),
                hour_of_day: hours_of(dt.time()),
            });
        }
    }
    for fmt in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Ok(ParsedTimestamp { day_key: None, hour_of_day: hours_of(t) });
        }
    }
    Err(EditorError::Timestamp(s.to_string()))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub time: String,
    pub value: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// User identifier.
    pub id: String,
    pub data: Vec<RawPoint>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDataset {
    pub entries: Vec<DatasetEntry>,
}

fn id_of(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl ReferenceDataset {
    /// Strict parse of `[{id, data: [{time, value}]}]`. Points with a null or
    /// non-numeric value are kept with `value: None`.
    pub fn from_json(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| EditorError::Dataset("expected an array of entries".into()))?;
        let mut entries = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let id = item
                .get("id")
                .and_then(id_of)
                .ok_or_else(|| EditorError::Dataset(format!("entry {i} has no usable id")))?;
            let points = item
                .get("data")
                .and_then(Value::as_array)
                .ok_or_else(|| EditorError::Dataset(format!("entry '{id}' has no data array")))?;
            let data = points
                .iter()
                .filter_map(|p| {
                    let time = p.get("time")?.as_str()?.to_string();
                    Some(RawPoint { time, value: p.get("value").and_then(Value::as_f64) })
                })
                .collect();
            entries.push(DatasetEntry { id, data });
        }
        Ok(Self { entries })
    }

    /// Like [`from_json`](Self::from_json) but a malformed payload becomes an empty dataset.
    pub fn from_json_lenient(value: &Value) -> Self {
        match Self::from_json(value) {
            Ok(ds) => ds,
            Err(e) => {
                warn!("ignoring malformed reference dataset: {e}");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// One user's samples for one calendar day, sorted by hour of day.
#[derive(Clone, Debug, PartialEq)]
pub struct DayGroup {
    pub user_id: String,
    pub day_key: Option<String>,
    pub samples: Vec<Sample>,
}

impl DayGroup {
    /// Identifier used as a pattern's source: `user@day`, or `user` for undated data.
    pub fn source_id(&self) -> String {
        match &self.day_key {
            Some(day) => format!("{}@{}", self.user_id, day),
            None => self.user_id.clone(),
        }
    }
}

/// Split every entry by calendar day; groups with fewer than `min_points` valid points are skipped.
pub fn group_by_day(dataset: &ReferenceDataset, min_points: usize) -> Vec<DayGroup> {
    let mut groups: BTreeMap<(String, Option<String>), Vec<Sample>> = BTreeMap::new();
    let mut bad_timestamps = 0usize;
    for entry in &dataset.entries {
        for point in &entry.data {
            let Some(value) = point.value.filter(|v| v.is_finite()) else { continue };
            match parse_timestamp(&point.time) {
                Ok(ts) => groups
                    .entry((entry.id.clone(), ts.day_key))
                    .or_default()
                    .push(Sample::new(ts.hour_of_day, value)),
                Err(_) => bad_timestamps += 1,
            }
        }
    }
    if bad_timestamps > 0 {
        debug!("skipped {bad_timestamps} dataset points with unparsable timestamps");
    }
    groups
        .into_iter()
        .filter_map(|((user_id, day_key), mut samples)| {
            if samples.len() < min_points {
                debug!("skipping day group {user_id}/{day_key:?}: {} points", samples.len());
                return None;
            }
            sort_by_time(&mut samples);
            Some(DayGroup { user_id, day_key, samples })
        })
        .collect()
}
