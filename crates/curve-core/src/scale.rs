// File: crates/curve-core/src/scale.rs
// Summary: Piecewise-linear control-point scale and easing used by curve reshaping and blends.

use serde::{Deserialize, Serialize};

use crate::types::EPSILON_TIME;

/// Control point of a reshaping curve: `x` in [0,1], `y` unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

impl CurvePoint {
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

/// Clamped piecewise-linear map from the control points' x's onto their y's.
#[derive(Clone, Debug)]
pub struct CurveScale {
    points: Vec<CurvePoint>,
}

impl CurveScale {
    /// Build from control points; non-finite points are dropped and the rest sorted by x.
    /// Returns `None` with fewer than two usable points.
    pub fn new(points: &[CurvePoint]) -> Option<Self> {
        let mut pts: Vec<CurvePoint> = points
            .iter()
            .copied()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .collect();
        if pts.len() < 2 { return None; }
        pts.sort_by(|a, b| a.x.total_cmp(&b.x));
        Some(Self { points: pts })
    }

    pub fn points(&self) -> &[CurvePoint] { &self.points }

    /// Map `x`; inputs outside the control range clamp to the end values.
    pub fn apply(&self, x: f64) -> f64 {
        let pts = &self.points;
        let first = pts[0];
        let last = pts[pts.len() - 1];
        if x <= first.x { return first.y; }
        if x >= last.x { return last.y; }
        let idx = pts.partition_point(|p| p.x <= x);
        let a = pts[idx - 1];
        let b = pts[idx];
        let dx = b.x - a.x;
        if dx.abs() < EPSILON_TIME { return a.y; }
        a.y + (x - a.x) / dx * (b.y - a.y)
    }
}

/// Symmetric cubic ease (slow at both ends), `t` clamped to [0,1].
#[inline]
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let u = t - 2.0;
        (u * u * u + 2.0) / 2.0
    }
}

/// Map `v` from [min, min+span] to [0,1]; a flat span maps everything to 0.
#[inline]
pub fn normalize(v: f64, min: f64, span: f64, flat: f64) -> f64 {
    if span < flat { 0.0 } else { (v - min) / span }
}

/// Linear blend `a*(1-t) + b*t`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}
