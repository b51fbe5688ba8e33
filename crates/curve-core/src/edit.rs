// File: crates/curve-core/src/edit.rs
// Summary: Pure transformations behind the edit operations (move, reshape, expand, clone, replace).
// Notes:
// - Every function takes the current samples by reference and returns a fresh
//   vector; `None` means the edit does not apply and nothing should change.
// - Results may be off-grid; the store regrids them on write.

use serde::{Deserialize, Serialize};

use crate::grid::{self, interpolate_sorted, sort_by_time, value_at, window};
use crate::pattern::Pattern;
use crate::scale::{ease_cubic_in_out, lerp, normalize, CurveScale};
use crate::selection::TimeRange;
use crate::series::{valid_samples, Sample};
use crate::types::{ValueDomain, EPSILON_TIME, FLAT_RANGE, GRID_TOLERANCE, HOURS_PER_DAY};

/// How a reshaping curve is applied to the selected window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveMode {
    /// Normalize selected values to [0,1], map through the curve, map back,
    /// with eased transition zones outside the window.
    #[default]
    NormalizeRemap,
    /// Use the curve's y at the sample's relative position as a multiplier.
    /// No transition zones.
    PositionMultiplier,
}

/// Translation applied to the selected samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const fn new(dx: f64, dy: f64) -> Self { Self { dx, dy } }
}

/// Eased blend zones of width `width` hours on both sides of `range`, cut at 0 and 24.
#[derive(Clone, Copy, Debug)]
struct TransitionZones {
    before_start: f64,
    after_end: f64,
    range: TimeRange,
}

impl TransitionZones {
    fn new(range: TimeRange, width: f64) -> Option<Self> {
        if !(width > 0.0) { return None; }
        Some(Self {
            before_start: (range.start - width).max(0.0),
            after_end: (range.end + width).min(HOURS_PER_DAY),
            range,
        })
    }

    /// Eased progress toward the window for a sample before it (0 far away, 1 at `start`).
    fn before(&self, t: f64) -> Option<f64> {
        let w = self.range.start - self.before_start;
        if w <= EPSILON_TIME || t < self.before_start || t >= self.range.start { return None; }
        Some(ease_cubic_in_out((t - self.before_start) / w))
    }

    /// Eased progress away from the window for a sample after it (0 at `end`, 1 far away).
    fn after(&self, t: f64) -> Option<f64> {
        let w = self.after_end - self.range.end;
        if w <= EPSILON_TIME || t <= self.range.end || t > self.after_end { return None; }
        Some(ease_cubic_in_out((t - self.range.end) / w))
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Shift samples inside `range` by `offset`, clamp values into `domain`, re-sort by time.
///
/// Unmoved samples inside the destination window are dropped so the moved
/// samples overwrite it.
pub fn move_window(data: &[Sample], range: TimeRange, offset: Offset, domain: ValueDomain) -> Vec<Sample> {
    let dest_start = range.start + offset.dx - EPSILON_TIME;
    let dest_end = range.end + offset.dx + EPSILON_TIME;
    let mut out: Vec<Sample> = data
        .iter()
        .filter_map(|p| {
            if !p.is_valid() {
                Some(*p)
            } else if range.contains(p.time) {
                Some(Sample::new(p.time + offset.dx, domain.clamp(p.value + offset.dy)))
            } else if p.time >= dest_start && p.time <= dest_end {
                None
            } else {
                Some(*p)
            }
        })
        .collect();
    sort_by_time(&mut out);
    out
}

/// Reshape the samples inside `range` with `curve`.
///
/// Returns `None` when the window holds no valid sample.
pub fn apply_curve(
    data: &[Sample],
    range: TimeRange,
    curve: &CurveScale,
    mode: CurveMode,
    transition_hours: f64,
    domain: ValueDomain,
) -> Option<Vec<Sample>> {
    let selected = window(data, range.start, range.end);
    let (lo, hi) = min_max(selected.iter().map(|p| p.value))?;
    let span = hi - lo;
    let flat = span < FLAT_RANGE;

    match mode {
        CurveMode::NormalizeRemap => {
            let remap = |v: f64| {
                if flat { lo } else { domain.clamp(curve.apply(normalize(v, lo, span, FLAT_RANGE)) * span + lo) }
            };
            let at_start = remap(value_at(data, range.start));
            let at_end = remap(value_at(data, range.end));
            let zones = TransitionZones::new(range, transition_hours);
            Some(
                data.iter()
                    .map(|p| {
                        if !p.is_valid() { return *p; }
                        let value = if range.contains(p.time) {
                            remap(p.value)
                        } else if let Some(e) = zones.and_then(|z| z.before(p.time)) {
                            lerp(p.value, at_start, e)
                        } else if let Some(e) = zones.and_then(|z| z.after(p.time)) {
                            lerp(at_end, p.value, e)
                        } else {
                            p.value
                        };
                        Sample::new(p.time, value)
                    })
                    .collect(),
            )
        }
        CurveMode::PositionMultiplier => {
            let duration = range.duration();
            Some(
                data.iter()
                    .map(|p| {
                        if !p.is_valid() || !range.contains(p.time) { return *p; }
                        if flat || duration <= EPSILON_TIME {
                            return Sample::new(p.time, lo);
                        }
                        let m = curve.apply((p.time - range.start) / duration);
                        Sample::new(p.time, domain.clamp(p.value * m))
                    })
                    .collect(),
            )
        }
    }
}

/// Concatenate `windows` in order and stretch them over the full day.
///
/// The scale factor is `24 / Σ duration`. Missing coverage at 0 or 24 is filled
/// with the nearest value. Returns `None` when the windows are empty or hold no samples.
pub fn expand_windows(data: &[Sample], windows: &[TimeRange]) -> Option<Vec<Sample>> {
    let windows: Vec<TimeRange> = windows.iter().filter_map(TimeRange::clamped_to_day).collect();
    let total: f64 = windows.iter().map(TimeRange::duration).sum();
    if total <= EPSILON_TIME { return None; }
    let scale = HOURS_PER_DAY / total;

    let mut out = Vec::new();
    let mut cursor = 0.0;
    for w in &windows {
        for p in window(data, w.start, w.end) {
            out.push(Sample::new(cursor + (p.time - w.start) * scale, p.value));
        }
        cursor += w.duration() * scale;
    }
    if out.is_empty() { return None; }
    sort_by_time(&mut out);

    let first = out[0];
    if first.time > 0.0 {
        out.insert(0, Sample::new(0.0, first.value));
    }
    let last = out[out.len() - 1];
    if last.time < HOURS_PER_DAY {
        out.push(Sample::new(HOURS_PER_DAY, last.value));
    }
    Some(out)
}

/// Copy the samples of `range` to a window of equal length starting at `target`.
///
/// Returns `None` when the target window leaves [0, 24].
pub fn clone_window(data: &[Sample], range: TimeRange, target: f64) -> Option<Vec<Sample>> {
    let target_range = TimeRange::new(target, target + range.duration());
    if !target.is_finite() || target_range.start < 0.0 || target_range.end > HOURS_PER_DAY {
        return None;
    }
    let source = window(data, range.start, range.end);
    let mut out: Vec<Sample> = data
        .iter()
        .copied()
        .filter(|p| p.is_valid() && !target_range.contains(p.time))
        .collect();
    for p in source {
        let moved = Sample::new(p.time - range.start + target, p.value);
        if !out.iter().any(|q| (q.time - moved.time).abs() < GRID_TOLERANCE) {
            out.push(moved);
        }
    }
    sort_by_time(&mut out);
    Some(out)
}

/// Replace the samples of `range` with `pattern`, time-normalized into the window.
///
/// The first and last 10% of the inserted samples blend toward the host's own
/// boundary values, the window is filled at every grid minute, and eased
/// transition zones of `transition_hours` soften the seams outside the window.
/// Returns `None` when the pattern has fewer than two valid samples or no extent.
pub fn replace_window(data: &[Sample], range: TimeRange, pattern: &Pattern, transition_hours: f64) -> Option<Vec<Sample>> {
    let mut pattern_data = valid_samples(&pattern.data);
    if pattern_data.len() < 2 { return None; }
    let pattern_span = pattern.end - pattern.start;
    if !(pattern_span > EPSILON_TIME) { return None; }
    sort_by_time(&mut pattern_data);

    let left = value_at(data, range.start);
    let right = value_at(data, range.end);
    let duration = range.duration();

    let mut inserted: Vec<Sample> = pattern_data
        .iter()
        .map(|p| {
            let nt = (p.time - pattern.start) / pattern_span;
            let value = if nt < 0.1 {
                lerp(left, p.value, (nt / 0.1).max(0.0))
            } else if nt > 0.9 {
                lerp(p.value, right, ((nt - 0.9) / 0.1).min(1.0))
            } else {
                p.value
            };
            Sample::new(range.start + nt * duration, value)
        })
        .collect();
    sort_by_time(&mut inserted);

    let mut inside: Vec<Sample> = grid::grid_times()
        .filter(|t| range.contains(*t))
        .map(|t| Sample::new(t, interpolate_sorted(&inserted, t)))
        .collect();
    if inside.is_empty() {
        inside = inserted;
    }
    let first_inside = inside[0].value;
    let last_inside = inside[inside.len() - 1].value;

    let zones = TransitionZones::new(range, transition_hours);
    let mut out: Vec<Sample> = data
        .iter()
        .copied()
        .filter(|p| p.is_valid() && !range.contains(p.time))
        .map(|p| {
            let value = if let Some(e) = zones.and_then(|z| z.before(p.time)) {
                lerp(p.value, first_inside, e)
            } else if let Some(e) = zones.and_then(|z| z.after(p.time)) {
                lerp(last_inside, p.value, e)
            } else {
                p.value
            };
            Sample::new(p.time, value)
        })
        .collect();
    out.extend(inside);
    sort_by_time(&mut out);
    Some(out)
}

/// Pattern samples shifted so that `pattern.start` lands on `target`.
pub fn shift_pattern(pattern: &Pattern, target: f64) -> Vec<Sample> {
    pattern
        .data
        .iter()
        .filter(|p| p.is_valid())
        .map(|p| Sample::new(p.time - pattern.start + target, p.value))
        .collect()
}
