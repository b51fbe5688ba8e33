// File: crates/curve-core/src/grid.rs
// Summary: Canonical one-minute, 24-hour sample grid and linear interpolation helpers.

use crate::series::{valid_samples, Sample};
use crate::types::{minute_to_hours, EPSILON_TIME, MINUTES_PER_DAY};

pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    if steps < 2 { return vec![start, end]; }
    let step = (end - start) / (steps as f64 - 1.0);
    (0..steps).map(|i| start + step * i as f64).collect()
}

/// Times of every grid point, `0/60 .. 1439/60`.
pub fn grid_times() -> impl Iterator<Item = f64> {
    (0..MINUTES_PER_DAY).map(minute_to_hours)
}

/// A full grid holding `value` everywhere.
pub fn constant(value: f64) -> Vec<Sample> {
    grid_times().map(|t| Sample::new(t, value)).collect()
}

/// Stable sort by time; invalid times sort last.
pub fn sort_by_time(data: &mut [Sample]) {
    data.sort_by(|a, b| a.time.total_cmp(&b.time));
}

fn is_sorted_valid(data: &[Sample]) -> bool {
    data.iter().all(Sample::is_valid) && data.windows(2).all(|w| w[0].time <= w[1].time)
}

/// Interpolate on samples already known to be valid and sorted by time.
///
/// Clamps to the first/last value outside the covered range and returns the
/// earlier value when the bracketing points share a time (within `EPSILON_TIME`).
pub fn interpolate_sorted(sorted: &[Sample], time: f64) -> f64 {
    if sorted.is_empty() { return 0.0; }
    let idx = sorted.partition_point(|s| s.time <= time);
    if idx == 0 { return sorted[0].value; }
    if idx == sorted.len() { return sorted[idx - 1].value; }
    let prev = sorted[idx - 1];
    let next = sorted[idx];
    let dt = next.time - prev.time;
    if dt.abs() < EPSILON_TIME { return prev.value; }
    let t = (time - prev.time) / dt;
    prev.value + t * (next.value - prev.value)
}

/// Linearly interpolated value of `data` at `time_hours`.
/// Invalid samples are ignored; empty input yields 0.
pub fn value_at(data: &[Sample], time_hours: f64) -> f64 {
    if is_sorted_valid(data) {
        return interpolate_sorted(data, time_hours);
    }
    let mut clean = valid_samples(data);
    sort_by_time(&mut clean);
    interpolate_sorted(&clean, time_hours)
}

/// Resample arbitrary samples onto the 1440-point grid.
///
/// Minutes outside the input's time span take the nearest boundary value.
/// Empty (or fully invalid) input produces an all-zero grid.
/// `regrid(&regrid(x)) == regrid(x)`.
pub fn regrid(samples: &[Sample]) -> Vec<Sample> {
    let mut clean = valid_samples(samples);
    if clean.is_empty() {
        return constant(0.0);
    }
    sort_by_time(&mut clean);
    grid_times().map(|t| Sample::new(t, interpolate_sorted(&clean, t))).collect()
}

/// Exactly one valid sample per grid minute, at the grid time.
pub fn is_on_grid(data: &[Sample]) -> bool {
    data.len() == MINUTES_PER_DAY
        && data
            .iter()
            .enumerate()
            .all(|(m, s)| s.value.is_finite() && (s.time - minute_to_hours(m)).abs() < 1e-9)
}

/// Valid samples with `start <= time <= end`, in input order.
pub fn window(data: &[Sample], start: f64, end: f64) -> Vec<Sample> {
    data.iter()
        .copied()
        .filter(|s| s.is_valid() && s.time >= start && s.time <= end)
        .collect()
}

