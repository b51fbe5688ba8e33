// File: crates/curve-core/src/pattern.rs
// Summary: Sliding-window search for boundary- and shape-compatible sub-sequences.
// Notes:
// - Read only: nothing here touches the store.
// - Candidates are pruned on boundary similarity alone before the more
//   expensive shape comparison runs.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::MatcherConfig;
use crate::dataset::{group_by_day, ReferenceDataset};
use crate::grid::{interpolate_sorted, linspace, sort_by_time};
use crate::selection::TimeRange;
use crate::series::{valid_samples, Sample};
use crate::store::SeriesStore;
use crate::types::{ValueDomain, DEDUP_WINDOW, EPSILON_TIME, FLAT_RANGE, HOURS_PER_DAY};

/// A candidate window proposed as a substitute for the current selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub source_id: String,
    pub start: f64,
    pub end: f64,
    pub data: Vec<Sample>,
    /// In [0,1]; 1 means identical.
    pub similarity: f64,
    pub left_value: f64,
    pub right_value: f64,
}

/// `1 - min(|a-b| / saturation, 1)`.
#[inline]
pub fn boundary_similarity(a: f64, b: f64, saturation: f64) -> f64 {
    1.0 - ((a - b).abs() / saturation).min(1.0)
}

/// Window resampled onto `n` points after normalizing time and value to [0,1].
/// `None` with fewer than two valid samples.
pub fn shape_profile(window: &[Sample], n: usize) -> Option<Vec<f64>> {
    let mut pts = valid_samples(window);
    if pts.len() < 2 { return None; }
    sort_by_time(&mut pts);
    let (t0, t1) = (pts[0].time, pts[pts.len() - 1].time);
    let (v0, v1) = pts.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.value), hi.max(p.value)));
    let t_span = t1 - t0;
    let v_span = v1 - v0;
    let norm: Vec<Sample> = pts
        .iter()
        .map(|p| {
            Sample::new(
                if t_span < FLAT_RANGE { 0.0 } else { (p.time - t0) / t_span },
                if v_span < FLAT_RANGE { 0.0 } else { (p.value - v0) / v_span },
            )
        })
        .collect();
    Some(linspace(0.0, 1.0, n.max(2)).into_iter().map(|t| interpolate_sorted(&norm, t)).collect())
}

/// `1 / (1 + sqrt(mean squared difference))` between two equally long profiles.
pub fn profile_similarity(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 { return 0.0; }
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    1.0 / (1.0 + (sum / n as f64).sqrt())
}

/// Shape similarity of two windows (0 when either has fewer than two samples).
pub fn shape_similarity(a: &[Sample], b: &[Sample], samples: usize) -> f64 {
    match (shape_profile(a, samples), shape_profile(b, samples)) {
        (Some(pa), Some(pb)) => profile_similarity(&pa, &pb),
        _ => 0.0,
    }
}

/// Precomputed facts about the query window.
struct Query {
    source_id: String,
    range: TimeRange,
    left: f64,
    right: f64,
    profile: Option<Vec<f64>>,
}

#[derive(Clone, Debug)]
pub struct PatternMatcher {
    config: MatcherConfig,
    saturation: f64,
}

impl PatternMatcher {
    pub fn new(config: MatcherConfig, domain: ValueDomain) -> Self {
        let saturation = config
            .boundary_saturation
            .filter(|s| *s > 0.0)
            .unwrap_or_else(|| domain.span());
        Self { config, saturation }
    }

    pub fn config(&self) -> &MatcherConfig { &self.config }

    fn prepare_query(&self, source_id: &str, query: &[Sample], range: TimeRange) -> Option<(Query, Vec<Sample>)> {
        let range = range.clamped_to_day()?;
        let mut sorted = valid_samples(query);
        if sorted.is_empty() { return None; }
        sort_by_time(&mut sorted);
        let profile = if self.config.use_shape {
            let lo = sorted.partition_point(|p| p.time < range.start);
            let hi = sorted.partition_point(|p| p.time <= range.end);
            shape_profile(&sorted[lo..hi], self.config.shape_samples)
        } else {
            None
        };
        let q = Query {
            source_id: source_id.to_string(),
            range,
            left: interpolate_sorted(&sorted, range.start),
            right: interpolate_sorted(&sorted, range.end),
            profile,
        };
        Some((q, sorted))
    }

    fn weight_total(&self) -> f64 {
        let w = self.config.weights;
        if self.config.use_shape { w.left + w.right + w.shape } else { w.left + w.right }
    }

    /// Score one candidate window `[start, start + duration]` of `candidate`
    /// (sorted, valid samples). `None` when pruned or too sparse.
    fn score_window(&self, q: &Query, candidate: &[Sample], start: f64) -> Option<(f64, f64, f64, std::ops::Range<usize>)> {
        let end = start + q.range.duration();
        let w = self.config.weights;
        let total = self.weight_total();
        let floor = self.config.similarity_floor;

        let left = interpolate_sorted(candidate, start);
        let right = interpolate_sorted(candidate, end);
        let boundary = w.left * boundary_similarity(q.left, left, self.saturation)
            + w.right * boundary_similarity(q.right, right, self.saturation);

        let lo = candidate.partition_point(|p| p.time < start);
        let hi = candidate.partition_point(|p| p.time <= end);
        if hi - lo < 2 { return None; }

        let score = if self.config.use_shape {
            // Best case: a perfect shape match.
            if (boundary + w.shape) / total <= floor { return None; }
            let shape = match (&q.profile, shape_profile(&candidate[lo..hi], self.config.shape_samples)) {
                (Some(a), Some(b)) => profile_similarity(a, &b),
                _ => 0.0,
            };
            (boundary + w.shape * shape) / total
        } else {
            boundary / total
        };
        Some((score, left, right, lo..hi))
    }

    /// Search `candidate` for windows matching the query.
    fn scan(&self, q: &Query, candidate_id: &str, candidate: &[Sample], out: &mut Vec<Pattern>) {
        let duration = q.range.duration();
        let same_source = candidate_id == q.source_id;
        let mut scored = 0usize;
        for p in candidate {
            let start = p.time;
            let end = start + duration;
            if end > HOURS_PER_DAY + EPSILON_TIME { break; }
            if same_source
                && (start - q.range.start).abs() < DEDUP_WINDOW
                && (end - q.range.end).abs() < DEDUP_WINDOW
            {
                continue;
            }
            let Some((similarity, left, right, span)) = self.score_window(q, candidate, start) else { continue };
            scored += 1;
            if similarity > self.config.similarity_floor {
                out.push(Pattern {
                    source_id: candidate_id.to_string(),
                    start,
                    end,
                    data: candidate[span].to_vec(),
                    similarity,
                    left_value: left,
                    right_value: right,
                });
            }
        }
        debug!("pattern scan of '{}': {} windows scored", candidate_id, scored);
    }

    /// Similarity of the window starting at `start` in `candidate`, without the
    /// self-overlap guard or the floor. `None` if the window is too sparse or pruned.
    pub fn score(&self, query: &[Sample], range: TimeRange, candidate: &[Sample], start: f64) -> Option<f64> {
        let (q, _) = self.prepare_query("", query, range)?;
        let mut sorted = valid_samples(candidate);
        sort_by_time(&mut sorted);
        self.score_window(&q, &sorted, start).map(|(s, ..)| s)
    }

    /// Search each candidate series for windows resembling `query` over `range`.
    /// `query_id` names the query's own series so its current window is skipped.
    pub fn find_similar(
        &self,
        query_id: &str,
        query: &[Sample],
        range: TimeRange,
        candidates: &[(&str, &[Sample])],
        top_k: usize,
    ) -> Vec<Pattern> {
        let Some((q, query_sorted)) = self.prepare_query(query_id, query, range) else { return Vec::new() };
        let mut found = Vec::new();
        for (id, data) in candidates {
            if *id == query_id {
                self.scan(&q, id, &query_sorted, &mut found);
            } else {
                let mut sorted = valid_samples(data);
                sort_by_time(&mut sorted);
                self.scan(&q, id, &sorted, &mut found);
            }
        }
        rank(found, top_k)
    }

    /// Search each listed store series within itself (the working-set search).
    pub fn find_in_store<S: AsRef<str>>(&self, store: &SeriesStore, range: TimeRange, series_ids: &[S]) -> Vec<Pattern> {
        let mut found = Vec::new();
        for id in series_ids {
            let Some(series) = store.find(id.as_ref()) else { continue };
            let Some((q, sorted)) = self.prepare_query(&series.id, &series.data, range) else { continue };
            self.scan(&q, &series.id, &sorted, &mut found);
        }
        rank(found, self.config.top_k)
    }

    /// Search a multi-user historical dataset, one day group at a time.
    pub fn find_in_dataset(&self, query_id: &str, query: &[Sample], range: TimeRange, dataset: &ReferenceDataset) -> Vec<Pattern> {
        let Some((q, _)) = self.prepare_query(query_id, query, range) else { return Vec::new() };
        let groups = group_by_day(dataset, self.config.min_day_points);
        let mut found = Vec::new();
        for g in &groups {
            self.scan(&q, &g.source_id(), &g.samples, &mut found);
        }
        debug!("dataset search: {} day groups, {} candidates", groups.len(), found.len());
        rank(found, self.config.dataset_top_k)
    }
}

/// Sort best-first, drop near-duplicate windows of the same source, keep `top_k`.
pub fn rank(mut patterns: Vec<Pattern>, top_k: usize) -> Vec<Pattern> {
    patterns.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    let mut kept: Vec<Pattern> = Vec::with_capacity(top_k);
    for p in patterns {
        if kept.len() >= top_k { break; }
        let duplicate = kept.iter().any(|k| {
            k.source_id == p.source_id
                && (k.start - p.start).abs() < DEDUP_WINDOW
                && (k.end - p.end).abs() < DEDUP_WINDOW
        });
        if !duplicate {
            kept.push(p);
        }
    }
    kept
}
