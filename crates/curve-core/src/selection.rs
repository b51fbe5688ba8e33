// File: crates/curve-core/src/selection.rs
// Summary: Active time window + series ids targeted by the next edit.
// Notes:
// - No validation happens here; empty or out-of-bounds ranges are legal and the
//   edit operations guard against them.

use serde::{Deserialize, Serialize};

use crate::types::{EPSILON_TIME, HOURS_PER_DAY};

/// Time window in hours; `contains` includes both ends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub const fn new(start: f64, end: f64) -> Self { Self { start, end } }

    pub fn duration(&self) -> f64 { self.end - self.start }

    pub fn contains(&self, t: f64) -> bool { t >= self.start && t <= self.end }

    /// Finite, non-empty and inside [0, 24].
    pub fn is_usable(&self) -> bool {
        self.start.is_finite()
            && self.end.is_finite()
            && self.end - self.start > EPSILON_TIME
            && self.start >= 0.0
            && self.end <= HOURS_PER_DAY
    }

    /// Intersect with [0, 24]; `None` when nothing usable remains.
    pub fn clamped_to_day(&self) -> Option<Self> {
        if !self.start.is_finite() || !self.end.is_finite() { return None; }
        let r = Self::new(self.start.max(0.0), self.end.min(HOURS_PER_DAY));
        if r.end - r.start > EPSILON_TIME { Some(r) } else { None }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub time_range: Option<TimeRange>,
    pub series_ids: Vec<String>,
}

impl Selection {
    pub fn set(&mut self, time_range: Option<TimeRange>, series_ids: Vec<String>) {
        self.time_range = time_range;
        self.series_ids = series_ids;
    }

    pub fn clear(&mut self) {
        self.time_range = None;
        self.series_ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.time_range.is_none() && self.series_ids.is_empty()
    }

    /// Forget `id` if it is selected.
    pub fn forget(&mut self, id: &str) {
        self.series_ids.retain(|s| s != id);
    }
}
