// File: crates/curve-core/src/editor.rs
// Summary: Editor facade: selection-driven edit operations, commit pipeline, undo/redo and import/export.
// Notes:
// - Every edit follows the same pipeline: snapshot before, compute on a private
//   copy, write back (the store regrids), snapshot after, record, notify.
// - Unmet preconditions are not errors: the edit is skipped and nothing is recorded.

use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::dataset::ReferenceDataset;
use crate::edit::{self, Offset};
use crate::events::{EditEvent, EditObserver};
use crate::grid;
use crate::history::{EditHistoryExport, HistoryLog, OperationKind, OperationParams, PendingOperation};
use crate::pattern::{Pattern, PatternMatcher};
use crate::scale::{CurvePoint, CurveScale};
use crate::selection::{Selection, TimeRange};
use crate::series::{valid_samples, Sample, Series, SeriesType};
use crate::store::SeriesStore;
use crate::types::HOURS_PER_DAY;

/// Why an edit did not happen.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    NoSelection,
    /// Selection range is not finite, empty, or entirely outside the day.
    InvalidRange,
    NoSeriesSelected,
    UnknownSeries(String),
    HiddenSeries(String),
    /// The selected window holds no samples.
    EmptyWindow,
    InvalidCurve,
    EmptyPattern,
    /// Clone target window leaves [0, 24].
    TargetOutOfBounds,
    NothingToImport,
}

/// Non-blocking problems found while applying an edit.
#[derive(Clone, Debug, PartialEq)]
pub enum EditWarning {
    /// The edited series has components; its sum invariant no longer holds.
    ParentHasChildren { id: String },
    /// Data written to the series was not on the sample grid and was regridded.
    GridRepaired { id: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditOutcome {
    Skipped(SkipReason),
    Applied { operation_id: String, warnings: Vec<EditWarning> },
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool { matches!(self, EditOutcome::Applied { .. }) }

    pub fn warnings(&self) -> &[EditWarning] {
        match self {
            EditOutcome::Applied { warnings, .. } => warnings,
            EditOutcome::Skipped(_) => &[],
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            EditOutcome::Skipped(r) => Some(r),
            EditOutcome::Applied { .. } => None,
        }
    }
}

/// `{id, data}` record accepted by [`Editor::import_series`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesImport {
    pub id: String,
    pub data: Vec<Sample>,
}

/// New data for one existing series.
struct Change {
    id: String,
    data: Vec<Sample>,
}

struct Commit {
    kind: OperationKind,
    params: OperationParams,
    time_range: Option<TimeRange>,
    changes: Vec<Change>,
    created: Vec<Series>,
    warnings: Vec<EditWarning>,
}

impl Commit {
    /// Single-series edit of the selected window.
    fn edit(kind: OperationKind, params: OperationParams, range: TimeRange, id: &str, data: Vec<Sample>) -> Self {
        Self {
            kind,
            params,
            time_range: Some(range),
            changes: vec![Change { id: id.to_string(), data }],
            created: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

type Step<T> = std::result::Result<T, SkipReason>;

fn notify(observers: &[Box<dyn EditObserver>], event: &EditEvent) {
    for o in observers {
        o.on_event(event);
    }
}

pub struct Editor {
    store: SeriesStore,
    history: HistoryLog,
    config: EditorConfig,
    matcher: PatternMatcher,
    observers: Vec<Box<dyn EditObserver>>,
    generated_seq: u64,
}

impl Default for Editor {
    fn default() -> Self { Self::new(EditorConfig::default()) }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            store: SeriesStore::new(),
            history: HistoryLog::new(config.max_history),
            matcher: PatternMatcher::new(config.matcher.clone(), config.domain),
            config,
            observers: Vec::new(),
            generated_seq: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig { &self.config }

    pub fn store(&self) -> &SeriesStore { &self.store }

    pub fn history(&self) -> &HistoryLog { &self.history }

    pub fn matcher(&self) -> &PatternMatcher { &self.matcher }

    pub fn find(&self, id: &str) -> Option<&Series> { self.store.find(id) }

    pub fn selection(&self) -> &Selection { self.store.selection() }

    pub fn subscribe(&mut self, observer: impl EditObserver + 'static) {
        debug!("observer '{}' subscribed", observer.id());
        self.observers.push(Box::new(observer));
    }

    fn emit(&self, event: EditEvent) {
        notify(&self.observers, &event);
    }

    // ---- store & selection ---------------------------------------------------

    /// Add or overwrite a series (not journaled). Returns true when its data was regridded.
    pub fn add_series(&mut self, series: Series) -> bool {
        let id = series.id.clone();
        let repaired = self.store.add(series);
        self.emit(EditEvent::SeriesAdded { id });
        repaired
    }

    /// Remove a series (not journaled); it also leaves the selection.
    pub fn delete_series(&mut self, id: &str) -> Option<Series> {
        let removed = self.store.delete(id)?;
        self.emit(EditEvent::SeriesRemoved { id: id.to_string() });
        Some(removed)
    }

    pub fn set_selection(&mut self, time_range: Option<TimeRange>, series_ids: Vec<String>) {
        self.store.set_selection(time_range, series_ids);
        self.emit(EditEvent::SelectionChanged);
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
        self.emit(EditEvent::SelectionChanged);
    }

    fn active_range(&self) -> Step<TimeRange> {
        let range = self.store.selection().time_range.ok_or(SkipReason::NoSelection)?;
        range.clamped_to_day().ok_or(SkipReason::InvalidRange)
    }

    fn require_series(&self, id: &str) -> Step<&Series> {
        self.store.find(id).ok_or_else(|| SkipReason::UnknownSeries(id.to_string()))
    }

    fn finish(&mut self, what: &str, step: Step<Commit>) -> EditOutcome {
        match step {
            Ok(c) => self.commit(c),
            Err(reason) => {
                debug!("{what} skipped: {reason:?}");
                EditOutcome::Skipped(reason)
            }
        }
    }

    fn commit(&mut self, c: Commit) -> EditOutcome {
        let mut warnings = c.warnings;
        let mut parents: BTreeSet<String> = BTreeSet::new();
        let mut affected: Vec<String> = Vec::new();
        for ch in &c.changes {
            if let Some(s) = self.store.find(&ch.id) {
                if let Some(p) = s.parent_id.as_ref().filter(|p| self.store.contains(p)) {
                    parents.insert(p.clone());
                }
            }
            if self.store.has_children(&ch.id) {
                warn!("series '{}' has components; editing it breaks their sum", ch.id);
                warnings.push(EditWarning::ParentHasChildren { id: ch.id.clone() });
            }
            affected.push(ch.id.clone());
        }
        for p in &parents {
            if !affected.contains(p) {
                affected.push(p.clone());
            }
        }

        let before = self.store.snapshot(&affected);
        for ch in c.changes {
            let repaired = self.store.replace_data(&ch.id, ch.data) == Some(true);
            let warning = EditWarning::GridRepaired { id: ch.id };
            if repaired && !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }
        for s in &c.created {
            self.store.add(s.clone());
            affected.push(s.id.clone());
        }
        for p in &parents {
            self.store.recompute_parent(p);
        }
        let after = self.store.snapshot(&affected);

        let op = self.history.record(PendingOperation {
            kind: c.kind,
            series_ids: affected.clone(),
            time_range: c.time_range,
            params: c.params,
            before_data: if before.is_empty() { None } else { Some(before) },
            after_data: Some(after),
            created_series: c.created,
        });
        let operation_id = op.id.clone();
        info!("committed {} ({:?}) on {:?}", operation_id, c.kind, affected);
        self.emit(EditEvent::Committed { operation_id: operation_id.clone(), kind: c.kind, series_ids: affected });
        EditOutcome::Applied { operation_id, warnings }
    }

    // ---- edit operations -----------------------------------------------------

    /// Shift the selected window of `series_id` by `offset` (values clamped to the domain).
    pub fn move_series(&mut self, series_id: &str, offset: Offset) -> EditOutcome {
        let step = self.plan_move(series_id, offset);
        self.finish("move", step)
    }

    fn plan_move(&self, series_id: &str, offset: Offset) -> Step<Commit> {
        let range = self.active_range()?;
        let series = self.require_series(series_id)?;
        if grid::window(&series.data, range.start, range.end).is_empty() {
            return Err(SkipReason::EmptyWindow);
        }
        let data = edit::move_window(&series.data, range, offset, self.config.domain);
        Ok(Commit::edit(OperationKind::Move, OperationParams::Move { offset }, range, series_id, data))
    }

    /// Reshape the selected window of `series_id` with control points in [0,1]×ℝ.
    pub fn apply_curve(&mut self, series_id: &str, curve: &[CurvePoint]) -> EditOutcome {
        let step = self.plan_curve(series_id, curve);
        self.finish("apply_curve", step)
    }

    fn plan_curve(&self, series_id: &str, curve: &[CurvePoint]) -> Step<Commit> {
        let range = self.active_range()?;
        let series = self.require_series(series_id)?;
        let scale = CurveScale::new(curve).ok_or(SkipReason::InvalidCurve)?;
        let mode = self.config.curve_mode;
        let data = edit::apply_curve(&series.data, range, &scale, mode, self.config.transition_hours, self.config.domain)
            .ok_or(SkipReason::EmptyWindow)?;
        let params = OperationParams::ApplyCurve { curve: scale.points().to_vec(), mode };
        Ok(Commit::edit(OperationKind::ApplyCurve, params, range, series_id, data))
    }

    /// Stretch `windows` of every selected series over the whole day; clears the selection.
    pub fn expand_time_series(&mut self, windows: &[TimeRange]) -> EditOutcome {
        let step = self.plan_expand(windows);
        let outcome = self.finish("expand", step);
        if outcome.is_applied() {
            self.clear_selection();
        }
        outcome
    }

    fn plan_expand(&self, windows: &[TimeRange]) -> Step<Commit> {
        let usable: Vec<TimeRange> = windows.iter().filter_map(TimeRange::clamped_to_day).collect();
        if usable.is_empty() { return Err(SkipReason::InvalidRange); }
        let ids = &self.store.selection().series_ids;
        if ids.is_empty() { return Err(SkipReason::NoSeriesSelected); }
        let changes: Vec<Change> = ids
            .iter()
            .filter_map(|id| {
                let series = self.store.find(id)?;
                let data = edit::expand_windows(&series.data, &usable)?;
                Some(Change { id: id.clone(), data })
            })
            .collect();
        if changes.is_empty() { return Err(SkipReason::EmptyWindow); }
        let total: f64 = usable.iter().map(TimeRange::duration).sum();
        Ok(Commit {
            kind: OperationKind::Expand,
            params: OperationParams::Expand { windows: usable, scale_factor: HOURS_PER_DAY / total },
            time_range: self.store.selection().time_range,
            changes,
            created: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Copy the selected window of a visible series to `[target_time, target_time + duration]`.
    pub fn clone_series(&mut self, series_id: &str, target_time: f64) -> EditOutcome {
        let step = self.plan_clone(series_id, target_time);
        self.finish("clone", step)
    }

    fn plan_clone(&self, series_id: &str, target_time: f64) -> Step<Commit> {
        let range = self.active_range()?;
        let series = self.require_series(series_id)?;
        if !series.visible { return Err(SkipReason::HiddenSeries(series_id.to_string())); }
        let data = edit::clone_window(&series.data, range, target_time).ok_or(SkipReason::TargetOutOfBounds)?;
        Ok(Commit::edit(OperationKind::Clone, OperationParams::Clone { target_time }, range, series_id, data))
    }

    /// Splice `pattern` into the selected window of each listed series
    /// (the selected series when `series_ids` is empty).
    pub fn replace_with_pattern<S: AsRef<str>>(&mut self, pattern: &Pattern, series_ids: &[S]) -> EditOutcome {
        let ids: Vec<String> = if series_ids.is_empty() {
            self.store.selection().series_ids.clone()
        } else {
            series_ids.iter().map(|s| s.as_ref().to_string()).collect()
        };
        let step = self.plan_replace(pattern, &ids);
        self.finish("replace_with_pattern", step)
    }

    /// [`replace_with_pattern`](Self::replace_with_pattern) on the selected series.
    pub fn replace_selected_with_pattern(&mut self, pattern: &Pattern) -> EditOutcome {
        self.replace_with_pattern::<&str>(pattern, &[])
    }

    fn plan_replace(&self, pattern: &Pattern, ids: &[String]) -> Step<Commit> {
        let range = self.active_range()?;
        if ids.is_empty() { return Err(SkipReason::NoSeriesSelected); }
        if valid_samples(&pattern.data).len() < 2 { return Err(SkipReason::EmptyPattern); }
        let mut changes = Vec::with_capacity(ids.len());
        for id in ids {
            let series = self.require_series(id)?;
            let data = edit::replace_window(&series.data, range, pattern, self.config.transition_hours)
                .ok_or(SkipReason::EmptyPattern)?;
            changes.push(Change { id: id.clone(), data });
        }
        Ok(Commit {
            kind: OperationKind::ReplaceWithPattern,
            params: OperationParams::ReplaceWithPattern {
                source_id: pattern.source_id.clone(),
                pattern_start: pattern.start,
                pattern_end: pattern.end,
                similarity: pattern.similarity,
            },
            time_range: Some(range),
            changes,
            created: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Create one `generated` series per selected series from `pattern`, shifted to `target_time`.
    pub fn generate_from_pattern(&mut self, pattern: &Pattern, target_time: f64) -> EditOutcome {
        let step = self.plan_generate(pattern, target_time);
        if let Ok(c) = &step {
            self.generated_seq += c.created.len() as u64;
        }
        self.finish("generate_from_pattern", step)
    }

    fn plan_generate(&self, pattern: &Pattern, target_time: f64) -> Step<Commit> {
        let range = self.active_range()?;
        let ids = &self.store.selection().series_ids;
        if ids.is_empty() { return Err(SkipReason::NoSeriesSelected); }
        if valid_samples(&pattern.data).is_empty() { return Err(SkipReason::EmptyPattern); }
        let shifted = grid::regrid(&edit::shift_pattern(pattern, target_time));
        let created: Vec<Series> = ids
            .iter()
            .filter(|id| self.store.contains(id))
            .enumerate()
            .map(|(i, id)| {
                let name = format!("{}_generated_{}", id, self.generated_seq + i as u64 + 1);
                let mut s = Series::with_data(name, SeriesType::Generated, shifted.clone());
                s.source_id = Some(id.clone());
                s
            })
            .collect();
        if created.is_empty() { return Err(SkipReason::UnknownSeries(ids[0].clone())); }
        Ok(Commit {
            kind: OperationKind::GenerateFromPattern,
            params: OperationParams::GenerateFromPattern { source_id: pattern.source_id.clone(), target_time },
            time_range: Some(range),
            changes: Vec::new(),
            created,
            warnings: Vec::new(),
        })
    }

    /// Upsert `{id, data}` records: existing ids get new data, new ids become
    /// visible `original` series. Journaled as one operation.
    pub fn import_series(&mut self, entries: Vec<SeriesImport>) -> EditOutcome {
        let step = self.plan_import(entries);
        self.finish("import", step)
    }

    fn plan_import(&self, entries: Vec<SeriesImport>) -> Step<Commit> {
        if entries.is_empty() { return Err(SkipReason::NothingToImport); }
        let count = entries.len();
        let mut changes: Vec<Change> = Vec::new();
        let mut created: Vec<Series> = Vec::new();
        let mut warnings = Vec::new();
        for e in entries {
            if !grid::is_on_grid(&e.data) {
                warn!("imported series '{}' is not on the sample grid; regridding", e.id);
                warnings.push(EditWarning::GridRepaired { id: e.id.clone() });
            }
            if self.store.contains(&e.id) {
                match changes.iter_mut().find(|c| c.id == e.id) {
                    Some(c) => c.data = e.data,
                    None => changes.push(Change { id: e.id, data: e.data }),
                }
            } else if let Some(existing) = created.iter_mut().find(|s| s.id == e.id) {
                existing.data = grid::regrid(&e.data);
            } else {
                created.push(Series::with_data(e.id, SeriesType::Original, grid::regrid(&e.data)));
            }
        }
        Ok(Commit {
            kind: OperationKind::Import,
            params: OperationParams::Import { count },
            time_range: None,
            changes,
            created,
            warnings,
        })
    }

    // ---- pattern search --------------------------------------------------------

    /// Similar windows inside `series_id` (or every selected series) for the selected range.
    pub fn find_similar_patterns(&self, series_id: Option<&str>) -> Vec<Pattern> {
        let Some(range) = self.store.selection().time_range else { return Vec::new() };
        let ids: Vec<String> = match series_id {
            Some(id) => vec![id.to_string()],
            None => self.store.selection().series_ids.clone(),
        };
        self.matcher.find_in_store(&self.store, range, &ids)
    }

    /// Similar windows in a historical dataset for the selected range of `series_id`.
    pub fn find_patterns_in_dataset(&self, series_id: &str, dataset: &ReferenceDataset) -> Vec<Pattern> {
        let Some(range) = self.store.selection().time_range else { return Vec::new() };
        let Some(series) = self.store.find(series_id) else { return Vec::new() };
        self.matcher.find_in_dataset(series_id, &series.data, range, dataset)
    }

    // ---- history ---------------------------------------------------------------

    pub fn can_undo(&self) -> bool { self.history.can_undo() }

    pub fn can_redo(&self) -> bool { self.history.can_redo() }

    /// Revert the last applied operation. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(op) = self.history.undo() else { return false };
        for s in &op.created_series {
            self.store.delete(&s.id);
        }
        if let Some(before) = &op.before_data {
            self.store.restore(before);
        }
        info!("undid {}", op.id);
        let event = EditEvent::Undone { operation_id: op.id.clone(), series_ids: op.series_ids.clone() };
        notify(&self.observers, &event);
        true
    }

    /// Re-apply the next undone operation. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(op) = self.history.redo() else { return false };
        for s in &op.created_series {
            self.store.add(s.clone());
        }
        if let Some(after) = &op.after_data {
            self.store.restore(after);
        }
        info!("redid {}", op.id);
        let event = EditEvent::Redone { operation_id: op.id.clone(), series_ids: op.series_ids.clone() };
        notify(&self.observers, &event);
        true
    }

    pub fn export_edit_history(&self) -> EditHistoryExport {
        self.history.export()
    }

    /// Replace the journal with an exported one (the store is left untouched).
    pub fn load_edit_history(&mut self, export: EditHistoryExport) {
        self.history = HistoryLog::from_export(export, self.config.max_history);
    }
}
