// File: crates/curve-core/src/history.rs
// Summary: Bounded linear undo/redo journal of per-operation before/after snapshots.
// Notes:
// - Cursor ranges over [-1, len-1]; -1 means everything is undone.
// - Recording after an undo discards the redoable tail (no branching).
// - The log only stores entries; applying them to a store is the editor's job.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::edit::{CurveMode, Offset};
use crate::scale::CurvePoint;
use crate::selection::TimeRange;
use crate::series::Series;
use crate::store::Snapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Move,
    ApplyCurve,
    Expand,
    Clone,
    ReplaceWithPattern,
    GenerateFromPattern,
    Import,
}

/// Operation-specific arguments, kept for display and replay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum OperationParams {
    Move { offset: Offset },
    ApplyCurve { curve: Vec<CurvePoint>, mode: CurveMode },
    #[serde(rename_all = "camelCase")]
    Expand { windows: Vec<TimeRange>, scale_factor: f64 },
    #[serde(rename_all = "camelCase")]
    Clone { target_time: f64 },
    #[serde(rename_all = "camelCase")]
    ReplaceWithPattern { source_id: String, pattern_start: f64, pattern_end: f64, similarity: f64 },
    #[serde(rename_all = "camelCase")]
    GenerateFromPattern { source_id: String, target_time: f64 },
    Import { count: usize },
}

/// A journal entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub series_ids: Vec<String>,
    pub time_range: Option<TimeRange>,
    pub params: OperationParams,
    /// Full copy of every affected pre-existing series before the edit.
    pub before_data: Option<Snapshot>,
    /// Full copy of every affected series after the edit.
    pub after_data: Option<Snapshot>,
    /// Series the operation added; undo removes them, redo re-adds them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_series: Vec<Series>,
}

/// Everything needed to record an operation except its id and timestamp.
#[derive(Clone, Debug)]
pub struct PendingOperation {
    pub kind: OperationKind,
    pub series_ids: Vec<String>,
    pub time_range: Option<TimeRange>,
    pub params: OperationParams,
    pub before_data: Option<Snapshot>,
    pub after_data: Option<Snapshot>,
    pub created_series: Vec<Series>,
}

/// Serializable snapshot of the journal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditHistoryExport {
    pub operations: Vec<Operation>,
    pub current_index: isize,
}

#[derive(Clone, Debug)]
pub struct HistoryLog {
    entries: VecDeque<Operation>,
    cursor: isize,
    capacity: usize,
    next_seq: u64,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self { entries: VecDeque::new(), cursor: -1, capacity: capacity.max(1), next_seq: 1 }
    }

    pub fn capacity(&self) -> usize { self.capacity }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Index of the last applied entry, -1 when none.
    pub fn cursor(&self) -> isize { self.cursor }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> { self.entries.iter() }

    pub fn can_undo(&self) -> bool { self.cursor >= 0 }

    pub fn can_redo(&self) -> bool { self.cursor < self.entries.len() as isize - 1 }

    /// Append an entry: drop the redo tail, evict the oldest past capacity,
    /// move the cursor to the new tail.
    pub fn record(&mut self, pending: PendingOperation) -> &Operation {
        self.entries.truncate((self.cursor + 1) as usize);
        let op = Operation {
            id: format!("op-{}", self.next_seq),
            timestamp: Utc::now(),
            kind: pending.kind,
            series_ids: pending.series_ids,
            time_range: pending.time_range,
            params: pending.params,
            before_data: pending.before_data,
            after_data: pending.after_data,
            created_series: pending.created_series,
        };
        self.next_seq += 1;
        self.entries.push_back(op);
        while self.entries.len() > self.capacity {
            if let Some(old) = self.entries.pop_front() {
                debug!("history full; evicted {}", old.id);
            }
        }
        self.cursor = self.entries.len() as isize - 1;
        &self.entries[self.cursor as usize]
    }

    /// Step back; returns the entry whose `before_data` must be restored.
    pub fn undo(&mut self) -> Option<&Operation> {
        if self.cursor < 0 { return None; }
        let idx = self.cursor as usize;
        self.cursor -= 1;
        self.entries.get(idx)
    }

    /// Step forward; returns the entry whose `after_data` must be restored.
    pub fn redo(&mut self) -> Option<&Operation> {
        if !self.can_redo() { return None; }
        self.cursor += 1;
        self.entries.get(self.cursor as usize)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
    }

    pub fn export(&self) -> EditHistoryExport {
        EditHistoryExport { operations: self.entries.iter().cloned().collect(), current_index: self.cursor }
    }

    /// Rebuild from an export. Entries beyond `capacity` are dropped from the
    /// head and the cursor is clamped into range.
    pub fn from_export(export: EditHistoryExport, capacity: usize) -> Self {
        let mut log = Self::new(capacity);
        let mut ops: VecDeque<Operation> = export.operations.into();
        let mut cursor = export.current_index;
        while ops.len() > log.capacity {
            ops.pop_front();
            cursor -= 1;
        }
        log.cursor = cursor.clamp(-1, ops.len() as isize - 1);
        log.next_seq = ops
            .iter()
            .filter_map(|o| o.id.strip_prefix("op-").and_then(|n| n.parse::<u64>().ok()))
            .max()
            .map_or(1, |n| n + 1);
        log.entries = ops;
        log
    }
}
