// File: crates/curve-core/tests/edits.rs
// Purpose: Validate the edit operations end to end through the editor (preconditions, results, grid invariant).

use approx::assert_abs_diff_eq;
use curve_core::types::MINUTES_PER_DAY;
use curve_core::{
    CurveMode, CurvePoint, EditOutcome, EditWarning, Editor, EditorConfig, Offset, OperationKind, Pattern, Sample,
    Series, SeriesImport, SeriesType, SkipReason, TimeRange,
};

/// Series whose value equals its time in hours.
fn ramp(id: &str) -> Series {
    let values: Vec<f64> = (0..MINUTES_PER_DAY).map(|m| m as f64 / 60.0).collect();
    Series::from_minute_values(id, &values)
}

fn editor_with(series: Vec<Series>) -> Editor {
    let mut editor = Editor::default();
    for s in series {
        editor.add_series(s);
    }
    editor
}

fn select(editor: &mut Editor, start: f64, end: f64, ids: &[&str]) {
    editor.set_selection(Some(TimeRange::new(start, end)), ids.iter().map(|s| s.to_string()).collect());
}

fn assert_on_grid(editor: &Editor) {
    for s in editor.store().iter() {
        assert!(s.is_on_grid(), "series '{}' left the grid", s.id);
    }
}

#[test]
fn move_lifts_only_the_selected_window() {
    let mut editor = editor_with(vec![Series::constant("X", 10.0)]);
    select(&mut editor, 8.0, 10.0, &["X"]);

    let outcome = editor.move_series("X", Offset::new(0.0, 5.0));
    assert!(outcome.is_applied());
    assert!(outcome.warnings().is_empty());

    let x = editor.find("X").expect("X");
    assert_eq!(x.data.len(), MINUTES_PER_DAY);
    for s in &x.data {
        let expected = if (8.0..=10.0).contains(&s.time) { 15.0 } else { 10.0 };
        assert_abs_diff_eq!(s.value, expected);
    }
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn move_in_time_overwrites_the_destination() {
    for dx in [-1.0, 1.0] {
        let mut editor = editor_with(vec![ramp("X")]);
        select(&mut editor, 8.0, 10.0, &["X"]);
        assert!(editor.move_series("X", Offset::new(dx, 0.0)).is_applied());
        assert_on_grid(&editor);

        let x = editor.find("X").expect("X");
        // destination [8+dx, 10+dx] carries the window's values
        for m in 0..=120 {
            let t = 8.0 + dx + m as f64 / 60.0;
            assert_abs_diff_eq!(x.value_at(t), t - dx, epsilon = 1e-6);
        }
        // a single step where the moved block meets unmoved data, no sawtooth
        let jumps = x.data.windows(2).filter(|w| (w[1].value - w[0].value).abs() > 0.5).count();
        assert_eq!(jumps, 1, "dx = {dx}");
    }
}

#[test]
fn off_grid_edit_results_are_repaired_and_reported() {
    let mut editor = editor_with(vec![ramp("X")]);
    select(&mut editor, 8.0, 10.0, &["X"]);
    let shifted = editor.move_series("X", Offset::new(0.25, 0.0));
    assert_eq!(shifted.warnings(), &[EditWarning::GridRepaired { id: "X".into() }]);
    assert_on_grid(&editor);

    let lifted = editor.move_series("X", Offset::new(0.0, 1.0));
    assert!(lifted.is_applied());
    assert!(lifted.warnings().is_empty());
}

#[test]
fn move_clamps_values_to_the_domain() {
    let mut editor = editor_with(vec![Series::constant("X", 10.0)]);
    select(&mut editor, 8.0, 10.0, &["X"]);
    editor.move_series("X", Offset::new(0.0, 500.0));
    assert_abs_diff_eq!(editor.find("X").expect("X").value_at(9.0), 100.0);

    editor.move_series("X", Offset::new(0.0, -500.0));
    assert_abs_diff_eq!(editor.find("X").expect("X").value_at(9.0), 0.0);
}

#[test]
fn edits_without_preconditions_are_skipped_silently() {
    let mut editor = editor_with(vec![Series::constant("X", 10.0)]);

    assert_eq!(editor.move_series("X", Offset::new(0.0, 1.0)), EditOutcome::Skipped(SkipReason::NoSelection));

    select(&mut editor, 8.0, 10.0, &["X"]);
    assert_eq!(
        editor.move_series("nope", Offset::new(0.0, 1.0)),
        EditOutcome::Skipped(SkipReason::UnknownSeries("nope".into()))
    );
    assert_eq!(
        editor.apply_curve("X", &[CurvePoint::new(0.0, 1.0)]).skip_reason(),
        Some(&SkipReason::InvalidCurve)
    );

    select(&mut editor, 30.0, 40.0, &["X"]);
    assert_eq!(editor.clone_series("X", 1.0).skip_reason(), Some(&SkipReason::InvalidRange));

    assert!(!editor.can_undo());
    assert!(editor.history().is_empty());
    assert!(editor.find("X").expect("X").values().iter().all(|v| *v == 10.0));
}

#[test]
fn expand_stretches_windows_over_the_day() {
    let mut editor = editor_with(vec![ramp("X")]);
    select(&mut editor, 6.0, 20.0, &["X"]);

    let outcome = editor.expand_time_series(&[TimeRange::new(6.0, 9.0), TimeRange::new(18.0, 20.0)]);
    assert!(outcome.is_applied());
    assert_on_grid(&editor);

    let x = editor.find("X").expect("X");
    assert_abs_diff_eq!(x.data[0].time, 0.0);
    assert_abs_diff_eq!(x.data[0].value, 6.0, epsilon = 1e-9);
    // 0.5 h into the first window lands at 0.5 * 24/5 = 2.4 h
    assert_abs_diff_eq!(x.value_at(2.4), 6.5, epsilon = 1e-6);
    // the second window starts at 3 * 4.8 = 14.4 h
    assert_abs_diff_eq!(x.value_at(14.4 + 0.48), 18.1, epsilon = 1e-6);
    assert_abs_diff_eq!(x.data[MINUTES_PER_DAY - 1].value, 20.0, epsilon = 0.01);
    assert!(x.values().iter().all(|v| v.is_finite()));

    // selection is consumed
    assert!(editor.selection().is_empty());
    let op = editor.history().operations().last().expect("recorded");
    assert_eq!(op.kind, OperationKind::Expand);
}

#[test]
fn expand_needs_selected_series_and_usable_windows() {
    let mut editor = editor_with(vec![ramp("X")]);
    editor.set_selection(None, Vec::new());
    assert_eq!(
        editor.expand_time_series(&[TimeRange::new(6.0, 9.0)]).skip_reason(),
        Some(&SkipReason::NoSeriesSelected)
    );
    select(&mut editor, 6.0, 9.0, &["X"]);
    assert_eq!(
        editor.expand_time_series(&[TimeRange::new(5.0, 5.0)]).skip_reason(),
        Some(&SkipReason::InvalidRange)
    );
}

#[test]
fn clone_rejects_targets_outside_the_day() {
    let mut editor = editor_with(vec![ramp("X")]);
    select(&mut editor, 8.0, 10.0, &["X"]);

    assert_eq!(editor.clone_series("X", -0.5).skip_reason(), Some(&SkipReason::TargetOutOfBounds));
    assert_eq!(editor.clone_series("X", 23.0).skip_reason(), Some(&SkipReason::TargetOutOfBounds));
    assert!(editor.history().is_empty());

    assert!(editor.clone_series("X", 22.0).is_applied());
}

#[test]
fn clone_overwrites_the_destination_window() {
    let mut editor = editor_with(vec![ramp("X")]);
    select(&mut editor, 8.0, 10.0, &["X"]);
    assert!(editor.clone_series("X", 18.0).is_applied());
    assert_on_grid(&editor);

    let x = editor.find("X").expect("X");
    assert_abs_diff_eq!(x.value_at(18.0), 8.0, epsilon = 1e-9);
    assert_abs_diff_eq!(x.value_at(18.5), 8.5, epsilon = 1e-9);
    assert_abs_diff_eq!(x.value_at(20.0), 10.0, epsilon = 1e-9);
    // source and the rest of the day untouched
    assert_abs_diff_eq!(x.value_at(9.0), 9.0, epsilon = 1e-9);
    assert_abs_diff_eq!(x.value_at(21.0), 21.0, epsilon = 1e-9);
}

#[test]
fn clone_requires_a_visible_series() {
    let mut editor = editor_with(vec![ramp("X").with_visible(false)]);
    select(&mut editor, 8.0, 10.0, &["X"]);
    assert_eq!(editor.clone_series("X", 12.0).skip_reason(), Some(&SkipReason::HiddenSeries("X".into())));
}

#[test]
fn curve_on_flat_selection_holds_the_value() {
    let mut editor = editor_with(vec![Series::constant("X", 10.0)]);
    select(&mut editor, 8.0, 10.0, &["X"]);
    let curve = [CurvePoint::new(0.0, 1.0), CurvePoint::new(1.0, 0.0)];
    assert!(editor.apply_curve("X", &curve).is_applied());
    assert!(editor.find("X").expect("X").values().iter().all(|v| (*v - 10.0).abs() < 1e-12));
}

#[test]
fn inverted_curve_swaps_window_extremes() {
    let mut editor = editor_with(vec![ramp("X")]);
    select(&mut editor, 8.0, 10.0, &["X"]);
    let curve = [CurvePoint::new(0.0, 1.0), CurvePoint::new(1.0, 0.0)];
    assert!(editor.apply_curve("X", &curve).is_applied());

    let x = editor.find("X").expect("X");
    assert_abs_diff_eq!(x.value_at(8.0), 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(x.value_at(9.0), 9.0, epsilon = 1e-9);
    assert_abs_diff_eq!(x.value_at(10.0), 8.0, epsilon = 1e-9);
    // beyond the 0.5 h transition zones nothing moves
    assert_abs_diff_eq!(x.value_at(7.0), 7.0, epsilon = 1e-9);
    assert_abs_diff_eq!(x.value_at(11.0), 11.0, epsilon = 1e-9);
    // halfway through each zone the ease sits at 0.5
    assert_abs_diff_eq!(x.value_at(7.75), 8.875, epsilon = 1e-9);
    assert_abs_diff_eq!(x.value_at(10.25), 9.125, epsilon = 1e-9);
    // the blend meets the reshaped value at the window edges
    let step = 1.0 / 60.0;
    assert!((x.value_at(8.0 - step) - x.value_at(8.0)).abs() < 0.02);
    assert!((x.value_at(10.0 + step) - x.value_at(10.0)).abs() < 0.02);
}

#[test]
fn curve_transition_cut_at_midnight_still_reaches_the_window() {
    let mut editor = editor_with(vec![ramp("X")]);
    select(&mut editor, 0.25, 2.0, &["X"]);
    let curve = [CurvePoint::new(0.0, 1.0), CurvePoint::new(1.0, 0.0)];
    assert!(editor.apply_curve("X", &curve).is_applied());
    assert_on_grid(&editor);

    let x = editor.find("X").expect("X");
    assert_abs_diff_eq!(x.value_at(0.25), 2.0, epsilon = 1e-9);
    // zone shrinks to [0, 0.25]: untouched at 0, nearly at the edge value one minute before it
    assert_abs_diff_eq!(x.value_at(0.0), 0.0, epsilon = 1e-9);
    assert!((x.value_at(0.25 - 1.0 / 60.0) - 2.0).abs() < 0.01);
    assert!(x.value_at(0.125) > 0.125 && x.value_at(0.125) < 2.0);
}

#[test]
fn position_multiplier_scales_by_curve_height() {
    let config = EditorConfig { curve_mode: CurveMode::PositionMultiplier, ..EditorConfig::default() };
    let mut editor = Editor::new(config);
    editor.add_series(ramp("X"));
    select(&mut editor, 8.0, 10.0, &["X"]);
    let curve = [CurvePoint::new(0.0, 2.0), CurvePoint::new(1.0, 2.0)];
    assert!(editor.apply_curve("X", &curve).is_applied());

    let x = editor.find("X").expect("X");
    assert_abs_diff_eq!(x.value_at(9.0), 18.0, epsilon = 1e-9);
    assert_abs_diff_eq!(x.value_at(10.5), 10.5, epsilon = 1e-9);
}

fn donor_pattern() -> Pattern {
    // 20 -> 30 over 2h..4h
    let data: Vec<Sample> = (120..=240)
        .map(|m| {
            let t = m as f64 / 60.0;
            Sample::new(t, 20.0 + (t - 2.0) * 5.0)
        })
        .collect();
    Pattern {
        source_id: "donor".into(),
        start: 2.0,
        end: 4.0,
        data,
        similarity: 0.9,
        left_value: 20.0,
        right_value: 30.0,
    }
}

/// 22 at 10h, 28 at 12h.
fn host(id: &str) -> Series {
    let values: Vec<f64> = (0..MINUTES_PER_DAY).map(|m| 22.0 + (m as f64 / 60.0 - 10.0) * 3.0).collect();
    Series::from_minute_values(id, &values)
}

#[test]
fn replace_blends_inserted_edges_toward_host_boundaries() {
    let mut editor = editor_with(vec![host("X")]);
    select(&mut editor, 10.0, 12.0, &["X"]);
    let outcome = editor.replace_with_pattern(&donor_pattern(), &["X"]);
    assert!(outcome.is_applied());
    assert_on_grid(&editor);

    let x = editor.find("X").expect("X");
    // first and last inserted samples follow the host, not the raw pattern
    assert_abs_diff_eq!(x.value_at(10.0), 22.0, epsilon = 1e-9);
    assert_abs_diff_eq!(x.value_at(12.0), 28.0, epsilon = 1e-9);
    // the middle comes from the pattern
    assert_abs_diff_eq!(x.value_at(11.0), 25.0, epsilon = 1e-9);
    // outside the transition zones the host is untouched
    assert_abs_diff_eq!(x.value_at(9.0), 19.0, epsilon = 1e-9);
    assert_abs_diff_eq!(x.value_at(13.0), 31.0, epsilon = 1e-9);
    // mid-zone blends and seam continuity
    assert_abs_diff_eq!(x.value_at(9.75), 21.625, epsilon = 1e-9);
    assert_abs_diff_eq!(x.value_at(12.25), 28.375, epsilon = 1e-9);
    let step = 1.0 / 60.0;
    assert!((x.value_at(10.0 - step) - x.value_at(10.0)).abs() < 0.06);
    assert!((x.value_at(12.0 + step) - x.value_at(12.0)).abs() < 0.06);
}

#[test]
fn replace_with_empty_pattern_is_skipped() {
    let mut editor = editor_with(vec![host("X")]);
    select(&mut editor, 10.0, 12.0, &["X"]);
    let empty = Pattern { data: Vec::new(), ..donor_pattern() };
    assert_eq!(editor.replace_selected_with_pattern(&empty).skip_reason(), Some(&SkipReason::EmptyPattern));
    assert!(editor.history().is_empty());
}

#[test]
fn editing_a_component_recomputes_its_parent() {
    let mut editor = editor_with(vec![
        Series::constant("P", 30.0),
        Series::constant("P_LF", 10.0).with_parent("P"),
        Series::constant("P_HF", 20.0).with_parent("P"),
    ]);
    select(&mut editor, 8.0, 10.0, &["P_LF"]);
    assert!(editor.move_series("P_LF", Offset::new(0.0, 5.0)).is_applied());

    assert_abs_diff_eq!(editor.find("P").expect("P").value_at(9.0), 35.0, epsilon = 1e-12);
    assert_abs_diff_eq!(editor.find("P").expect("P").value_at(12.0), 30.0, epsilon = 1e-12);
    let op = editor.history().operations().last().expect("recorded");
    assert!(op.series_ids.contains(&"P".to_string()));

    assert!(editor.undo());
    assert_abs_diff_eq!(editor.find("P").expect("P").value_at(9.0), 30.0, epsilon = 1e-12);
    assert_abs_diff_eq!(editor.find("P_LF").expect("P_LF").value_at(9.0), 10.0, epsilon = 1e-12);
}

#[test]
fn editing_a_parent_warns_but_proceeds() {
    let mut editor = editor_with(vec![
        Series::constant("P", 30.0),
        Series::constant("P_LF", 10.0).with_parent("P"),
    ]);
    select(&mut editor, 8.0, 10.0, &["P"]);
    let outcome = editor.move_series("P", Offset::new(0.0, 1.0));
    assert!(outcome.is_applied());
    assert_eq!(outcome.warnings(), &[EditWarning::ParentHasChildren { id: "P".into() }]);
    assert_abs_diff_eq!(editor.find("P").expect("P").value_at(9.0), 31.0);
}

#[test]
fn generated_series_come_and_go_with_undo_redo() {
    let mut editor = editor_with(vec![host("X")]);
    select(&mut editor, 10.0, 12.0, &["X"]);
    assert!(editor.generate_from_pattern(&donor_pattern(), 14.0).is_applied());

    let generated = editor.find("X_generated_1").expect("generated series");
    assert_eq!(generated.series_type, SeriesType::Generated);
    assert_eq!(generated.source_id.as_deref(), Some("X"));
    assert!(generated.parent_id.is_none());
    assert_abs_diff_eq!(generated.value_at(14.0), 20.0, epsilon = 1e-9);
    assert_abs_diff_eq!(generated.value_at(16.0), 30.0, epsilon = 1e-9);

    assert!(editor.undo());
    assert!(editor.find("X_generated_1").is_none());
    assert!(editor.redo());
    assert!(editor.find("X_generated_1").is_some());

    assert!(editor.generate_from_pattern(&donor_pattern(), 1.0).is_applied());
    assert!(editor.find("X_generated_2").is_some());
}

#[test]
fn import_upserts_and_is_undoable() {
    let mut editor = editor_with(vec![Series::constant("A", 1.0)]);
    let outcome = editor.import_series(vec![
        SeriesImport { id: "A".into(), data: curve_core::grid::constant(4.0) },
        SeriesImport { id: "B".into(), data: vec![Sample::new(0.0, 0.0), Sample::new(24.0, 24.0)] },
    ]);
    assert_eq!(outcome.warnings(), &[EditWarning::GridRepaired { id: "B".into() }]);

    let b = editor.find("B").expect("B");
    assert_eq!(b.series_type, SeriesType::Original);
    assert!(b.visible);
    assert!(b.is_on_grid());
    assert_abs_diff_eq!(editor.find("A").expect("A").value_at(3.0), 4.0);

    assert!(editor.undo());
    assert!(editor.find("B").is_none());
    assert_abs_diff_eq!(editor.find("A").expect("A").value_at(3.0), 1.0);

    assert_eq!(editor.import_series(Vec::new()).skip_reason(), Some(&SkipReason::NothingToImport));
}
