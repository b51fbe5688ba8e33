// File: crates/curve-core/src/series.rs
// Summary: Sample and Series model for one-day energy curves.
// Notes:
// - `data` is replaced wholesale by edits (copy then replace); nothing mutates a
//   series' samples in place across an operation boundary.

use serde::{Deserialize, Serialize};

use crate::grid;
use crate::types::MINUTES_PER_DAY;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesType {
    #[default]
    #[serde(rename = "original")]
    Original,
    #[serde(rename = "generated")]
    Generated,
    #[serde(rename = "preview")]
    Preview,
    /// Low-frequency component of a decomposed signal.
    #[serde(rename = "LF")]
    LowFrequency,
    /// Mid-frequency component.
    #[serde(rename = "MF")]
    MidFrequency,
    /// High-frequency component.
    #[serde(rename = "HF")]
    HighFrequency,
}

/// One point of a curve: `time` in hours of the day, `value` in domain units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
}

impl Sample {
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }

    /// Both coordinates are finite numbers.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.time.is_finite() && self.value.is_finite()
    }
}

/// Drop NaN/infinite samples, keeping order.
pub fn valid_samples(data: &[Sample]) -> Vec<Sample> {
    data.iter().copied().filter(Sample::is_valid).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: String,
    pub data: Vec<Sample>,
    #[serde(rename = "type", default)]
    pub series_type: SeriesType,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// When set, this series is a component of the parent and the parent equals
    /// the sum of its components at every grid index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Series this one was generated from (informational only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

fn default_visible() -> bool { true }

impl Series {
    pub fn new(id: impl Into<String>, series_type: SeriesType) -> Self {
        Self {
            id: id.into(),
            data: Vec::new(),
            series_type,
            visible: true,
            parent_id: None,
            source_id: None,
        }
    }

    pub fn with_data(id: impl Into<String>, series_type: SeriesType, data: Vec<Sample>) -> Self {
        Self { data, ..Self::new(id, series_type) }
    }

    /// Series of `MINUTES_PER_DAY` points, all holding `value`.
    pub fn constant(id: impl Into<String>, value: f64) -> Self {
        Self::with_data(id, SeriesType::Original, grid::constant(value))
    }

    /// Series built from one value per grid minute; missing minutes repeat the last value.
    pub fn from_minute_values(id: impl Into<String>, values: &[f64]) -> Self {
        let data = if values.is_empty() {
            grid::constant(0.0)
        } else {
            (0..MINUTES_PER_DAY)
                .map(|m| Sample::new(crate::types::minute_to_hours(m), values[m.min(values.len() - 1)]))
                .collect()
        };
        Self::with_data(id, SeriesType::Original, data)
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Values only, in grid order.
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().map(|s| s.value).collect()
    }

    /// Interpolated value at `time_hours` (see [`grid::value_at`]).
    pub fn value_at(&self, time_hours: f64) -> f64 {
        grid::value_at(&self.data, time_hours)
    }

    /// True when data holds exactly one valid sample per grid minute.
    pub fn is_on_grid(&self) -> bool {
        grid::is_on_grid(&self.data)
    }

    /// Downsample with LTTB to at most `max_points`.
    pub fn downsample_lttb(&self, max_points: usize) -> Vec<Sample> {
        crate::downsample::lttb(&self.data, max_points)
    }

    /// Gap-filled and LTTB-reduced points for display (see [`crate::downsample::prepare_for_display`]).
    pub fn prepare_for_display(&self, max_points: usize) -> Vec<Sample> {
        crate::downsample::prepare_for_display(&self.data, max_points)
    }
}
