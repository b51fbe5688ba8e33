// File: crates/curve-core/tests/history.rs
// Purpose: Validate the bounded undo/redo journal, editor round trips and history export/import.

use approx::assert_abs_diff_eq;
use curve_core::history::PendingOperation;
use curve_core::{
    CurvePoint, EditHistoryExport, Editor, EditorConfig, HistoryLog, Offset, OperationKind, OperationParams, Series,
    TimeRange,
};

fn pending(n: usize) -> PendingOperation {
    PendingOperation {
        kind: OperationKind::Import,
        series_ids: vec![format!("s{n}")],
        time_range: None,
        params: OperationParams::Import { count: n },
        before_data: None,
        after_data: None,
        created_series: Vec::new(),
    }
}

fn ids(log: &HistoryLog) -> Vec<String> {
    log.operations().map(|o| o.id.clone()).collect()
}

#[test]
fn log_evicts_oldest_entries_fifo() {
    let mut log = HistoryLog::new(3);
    for n in 0..5 {
        log.record(pending(n));
    }
    assert_eq!(log.len(), 3);
    assert_eq!(ids(&log), vec!["op-3", "op-4", "op-5"]);
    assert_eq!(log.cursor(), 2);
    assert!(log.can_undo());
    assert!(!log.can_redo());
}

#[test]
fn cursor_walks_between_minus_one_and_tail() {
    let mut log = HistoryLog::new(10);
    assert!(log.undo().is_none());
    log.record(pending(0));
    log.record(pending(1));

    assert_eq!(log.undo().map(|o| o.id.clone()), Some("op-2".to_string()));
    assert_eq!(log.undo().map(|o| o.id.clone()), Some("op-1".to_string()));
    assert_eq!(log.cursor(), -1);
    assert!(log.undo().is_none());
    assert!(!log.can_undo());

    assert_eq!(log.redo().map(|o| o.id.clone()), Some("op-1".to_string()));
    assert_eq!(log.redo().map(|o| o.id.clone()), Some("op-2".to_string()));
    assert!(log.redo().is_none());

    log.clear();
    assert!(log.is_empty());
    assert_eq!(log.cursor(), -1);
    assert!(!log.can_undo());
}

#[test]
fn recording_after_undo_discards_redo_tail() {
    let mut log = HistoryLog::new(10);
    for n in 0..3 {
        log.record(pending(n));
    }
    log.undo();
    log.undo();
    log.record(pending(9));
    assert_eq!(ids(&log), vec!["op-1", "op-4"]);
    assert!(!log.can_redo());
    assert_eq!(log.cursor(), 1);
}

#[test]
fn editor_history_respects_configured_bound() {
    let config = EditorConfig { max_history: 4, ..EditorConfig::default() };
    let mut editor = Editor::new(config);
    editor.add_series(Series::constant("X", 10.0));
    editor.set_selection(Some(TimeRange::new(1.0, 2.0)), vec!["X".into()]);
    for _ in 0..6 {
        assert!(editor.move_series("X", Offset::new(0.0, 1.0)).is_applied());
    }
    assert_eq!(editor.history().len(), 4);
    let first = editor.history().operations().next().expect("entry");
    assert_eq!(first.id, "op-3");

    // only the retained four can be undone
    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    assert_eq!(undone, 4);
    assert_abs_diff_eq!(editor.find("X").expect("X").value_at(1.5), 12.0);
}

#[test]
fn undo_redo_round_trip_across_operations() {
    let mut editor = Editor::default();
    let values: Vec<f64> = (0..1440).map(|m| 20.0 + (m as f64 / 60.0)).collect();
    editor.add_series(Series::from_minute_values("X", &values));
    let original = editor.find("X").expect("X").data.clone();

    editor.set_selection(Some(TimeRange::new(4.0, 7.0)), vec!["X".into()]);
    assert!(editor.move_series("X", Offset::new(0.0, 12.0)).is_applied());
    let curve = [CurvePoint::new(0.0, 0.2), CurvePoint::new(1.0, 0.8)];
    assert!(editor.apply_curve("X", &curve).is_applied());
    assert!(editor.clone_series("X", 15.0).is_applied());
    let edited = editor.find("X").expect("X").data.clone();
    assert_ne!(edited, original);

    while editor.undo() {}
    assert_eq!(editor.find("X").expect("X").data, original);
    assert_eq!(editor.history().cursor(), -1);

    while editor.redo() {}
    assert_eq!(editor.find("X").expect("X").data, edited);
}

#[test]
fn export_serializes_camel_case_and_reloads() {
    let mut editor = Editor::default();
    editor.add_series(Series::constant("X", 10.0));
    editor.set_selection(Some(TimeRange::new(8.0, 10.0)), vec!["X".into()]);
    editor.move_series("X", Offset::new(0.0, 5.0));
    editor.clone_series("X", 12.0);
    editor.undo();

    let export = editor.export_edit_history();
    assert_eq!(export.operations.len(), 2);
    assert_eq!(export.current_index, 0);

    let json = serde_json::to_value(&export).expect("serialize");
    assert_eq!(json["currentIndex"], 0);
    let first = &json["operations"][0];
    assert_eq!(first["type"], "move");
    assert_eq!(first["seriesIds"][0], "X");
    assert_eq!(first["params"]["kind"], "move");
    assert!(first["beforeData"]["X"].is_array());
    assert!(first["afterData"]["X"].is_array());
    assert_eq!(first["timeRange"]["start"], 8.0);

    let text = serde_json::to_string(&export).expect("serialize");
    let back: EditHistoryExport = serde_json::from_str(&text).expect("deserialize");
    let mut fresh = Editor::default();
    fresh.load_edit_history(back);
    assert!(fresh.can_undo());
    assert!(fresh.can_redo());
    assert_eq!(fresh.history().len(), 2);
}

#[test]
fn from_export_trims_to_capacity_and_clamps_cursor() {
    let mut log = HistoryLog::new(10);
    for n in 0..5 {
        log.record(pending(n));
    }
    let rebuilt = HistoryLog::from_export(log.export(), 2);
    assert_eq!(ids(&rebuilt), vec!["op-4", "op-5"]);
    assert_eq!(rebuilt.cursor(), 1);

    let mut rebuilt = rebuilt;
    let next = rebuilt.record(pending(7));
    assert_eq!(next.id, "op-6");

    let odd = EditHistoryExport { operations: log.export().operations, current_index: 42 };
    assert_eq!(HistoryLog::from_export(odd, 10).cursor(), 4);
}
