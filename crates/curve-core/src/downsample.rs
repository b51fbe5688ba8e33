// File: crates/curve-core/src/downsample.rs
// Summary: Display preparation: gap filling and LTTB downsampling of curves.

use crate::grid::sort_by_time;
use crate::series::{valid_samples, Sample};

/// Gaps wider than this (hours) get linear transition points.
pub const GAP_THRESHOLD: f64 = 0.05;
/// Spacing (hours) of inserted transition points.
pub const GAP_STEP: f64 = 0.01;
/// Upper bound on points inserted into one gap.
pub const MAX_GAP_POINTS: usize = 20;

/// Largest-Triangle-Three-Buckets downsampling.
/// Returns up to `threshold` points preserving overall shape.
pub fn lttb(points: &[Sample], threshold: usize) -> Vec<Sample> {
    let n = points.len();
    if threshold == 0 || n == 0 { return Vec::new(); }
    if threshold >= n || n <= 2 { return points.to_vec(); }
    if threshold == 1 { return vec![points[0]]; }

    let bucket_size = (n - 2) as f64 / (threshold - 2) as f64;
    let mut sampled = Vec::with_capacity(threshold);
    // Always include first
    sampled.push(points[0]);

    let mut a = 0usize; // index of the point kept from the previous bucket

    for i in 0..(threshold - 2) {
        let start = (1.0 + (i as f64) * bucket_size).floor() as usize;
        let end = (1.0 + ((i + 1) as f64) * bucket_size).floor().min((n - 1) as f64) as usize;

        // Average of the next bucket
        let next_end = (1.0 + ((i + 2) as f64) * bucket_size).floor().min(n as f64 - 1.0) as usize;
        let rs = end.max(1);
        let re = next_end.max(rs + 1).min(n);
        let (mut avg_t, mut avg_v) = (0.0f64, 0.0f64);
        for p in &points[rs..re] {
            avg_t += p.time;
            avg_v += p.value;
        }
        let count = (re - rs).max(1) as f64;
        avg_t /= count;
        avg_v /= count;

        // Keep the point of this bucket spanning the largest triangle with the
        // previous kept point and the next bucket's average.
        let pa = points[a];
        let mut max_area = -1.0f64;
        let mut max_idx = start;
        for (k, p) in points.iter().enumerate().take(end.max(start + 1)).skip(start) {
            let area = ((pa.time - p.time) * (avg_v - pa.value) - (pa.time - avg_t) * (p.value - pa.value)).abs();
            if area > max_area {
                max_area = area;
                max_idx = k;
            }
        }
        sampled.push(points[max_idx]);
        a = max_idx;
    }

    // Always include last
    sampled.push(points[n - 1]);
    sampled
}

/// Insert linear transition points into gaps wider than [`GAP_THRESHOLD`].
/// Input must be sorted by time.
pub fn fill_gaps(sorted: &[Sample]) -> Vec<Sample> {
    if sorted.len() <= 1 { return sorted.to_vec(); }
    let mut out = Vec::with_capacity(sorted.len());
    for pair in sorted.windows(2) {
        let (cur, next) = (pair[0], pair[1]);
        out.push(cur);
        let gap = next.time - cur.time;
        if gap > GAP_THRESHOLD {
            let steps = ((gap / GAP_STEP).ceil() as usize).min(MAX_GAP_POINTS);
            for j in 1..steps {
                let r = j as f64 / steps as f64;
                out.push(Sample::new(cur.time + gap * r, cur.value + (next.value - cur.value) * r));
            }
        }
    }
    out.push(sorted[sorted.len() - 1]);
    out
}

/// Sort, fill gaps, and reduce to at most `max_points` for drawing.
pub fn prepare_for_display(data: &[Sample], max_points: usize) -> Vec<Sample> {
    let mut pts = valid_samples(data);
    sort_by_time(&mut pts);
    let filled = fill_gaps(&pts);
    if filled.len() > max_points { lttb(&filled, max_points) } else { filled }
}
