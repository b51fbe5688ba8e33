// File: crates/curve-core/src/types.rs
// Summary: Shared constants (grid size, tolerances) and the value domain used for clamping.

use serde::{Deserialize, Serialize};

/// Number of samples in one day of data (one per minute).
pub const MINUTES_PER_DAY: usize = 1440;
/// Length of the time axis, in hours.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Two times closer than this (hours) are treated as the same instant.
pub const EPSILON_TIME: f64 = 1e-4;
/// Windows whose start and end both lie within this distance (hours) are duplicates.
pub const DEDUP_WINDOW: f64 = 0.1;
/// Minimum spacing (hours) between two inserted samples.
pub const GRID_TOLERANCE: f64 = 1e-3;
/// A value range narrower than this is considered flat.
pub const FLAT_RANGE: f64 = 1e-4;

/// Valid value range for edited samples.
/// Contract: `min() < max()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueDomain {
    /// Simple mode, values in [0, 100].
    #[default]
    Simple,
    /// Parent/child energy mode, values in [0, 15000].
    Energy,
}

impl ValueDomain {
    pub const fn min(&self) -> f64 { 0.0 }

    pub const fn max(&self) -> f64 {
        match self {
            ValueDomain::Simple => 100.0,
            ValueDomain::Energy => 15_000.0,
        }
    }

    /// Width of the domain (max - min).
    pub fn span(&self) -> f64 { self.max() - self.min() }

    #[inline]
    pub fn clamp(&self, v: f64) -> f64 { v.clamp(self.min(), self.max()) }
}

/// Time of the grid point at `minute`, in hours.
#[inline]
pub fn minute_to_hours(minute: usize) -> f64 {
    minute as f64 / 60.0
}
