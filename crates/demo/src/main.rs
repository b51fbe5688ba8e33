// File: crates/demo/src/main.rs
// Summary: Demo loads a day of load-curve samples (CSV or synthetic) and runs a scripted editing session.

use anyhow::{Context, Result};
use curve_core::source::{fetch_reference_dataset, publish_series};
use curve_core::{
    parse_timestamp, CurvePoint, EditOutcome, Editor, EditorConfig, EventRecorder, MemorySource,
    Offset, Sample, SeriesImport, TimeRange,
};
use log::{info, warn};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const DATASET_PATH: &str = "/api/reference-days";
const PUBLISH_PATH: &str = "/api/edited-series";

fn main() -> Result<()> {
    env_logger::init();

    // Optional CSV input and TOML config: curve-demo [data.csv] [editor.toml]
    let mut args = std::env::args().skip(1);
    let input = args.next();
    let config = match args.next() {
        Some(p) => EditorConfig::from_file(&p).with_context(|| format!("failed to load config '{p}'"))?,
        None => EditorConfig::default(),
    };

    let imports = match &input {
        Some(p) => {
            let path = Path::new(p);
            load_csv(path).with_context(|| format!("failed to load CSV '{}'", path.display()))?
        }
        None => {
            println!("No input file given; using a synthetic day");
            synthetic_day()
        }
    };
    if imports.is_empty() {
        anyhow::bail!("no series loaded; check headers/delimiter.");
    }
    let primary = imports[0].id.clone();
    println!("Loaded {} series (editing '{}')", imports.len(), primary);

    let recorder = Rc::new(EventRecorder::new());
    let mut editor = Editor::new(config);
    editor.subscribe(Rc::clone(&recorder));

    report("import", &editor.import_series(imports));
    let all_ids = editor.store().ids();

    // 1) Lift the morning window
    editor.set_selection(Some(TimeRange::new(8.0, 10.0)), vec![primary.clone()]);
    report("move +5", &editor.move_series(&primary, Offset::new(0.0, 5.0)));

    // 2) Reshape it with an S-curve
    let curve = [CurvePoint::new(0.0, 0.0), CurvePoint::new(0.3, 0.1), CurvePoint::new(0.7, 0.9), CurvePoint::new(1.0, 1.0)];
    report("apply curve", &editor.apply_curve(&primary, &curve));

    // 3) Look for a substitute inside the working set and splice the best one in
    let found = editor.find_similar_patterns(Some(&primary));
    println!("Working-set search: {} candidate(s)", found.len());
    for p in &found {
        println!("  {} [{:.2}, {:.2}] similarity {:.3}", p.source_id, p.start, p.end, p.similarity);
    }
    if let Some(best) = found.first() {
        report("replace with pattern", &editor.replace_selected_with_pattern(best));
    }

    // 4) Same query against a multi-day reference dataset served by the data source
    let source = MemorySource::new().with_response(DATASET_PATH, reference_dataset_json());
    let dataset = fetch_reference_dataset(&source, DATASET_PATH, &[("days", "2")]);
    let from_dataset = editor.find_patterns_in_dataset(&primary, &dataset);
    println!("Dataset search: {} day group(s) -> {} candidate(s)", dataset.len(), from_dataset.len());
    if let Some(best) = from_dataset.first() {
        report("generate from pattern", &editor.generate_from_pattern(best, 14.0));
    }

    // 5) Undo and redo the last edit
    let undone = editor.undo();
    let redone = editor.redo();
    println!("undo: {undone} / redo: {redone}");

    // 6) Copy the morning window to the evening
    report("clone to 18h", &editor.clone_series(&primary, 18.0));

    // 7) Stretch two windows over the whole day for every loaded series
    editor.set_selection(Some(TimeRange::new(6.0, 20.0)), all_ids);
    report(
        "expand",
        &editor.expand_time_series(&[TimeRange::new(6.0, 9.0), TimeRange::new(18.0, 20.0)]),
    );

    // Summary
    for s in editor.store().iter() {
        let shown = s.prepare_for_display(300);
        let (lo, hi) = minmax(&s.data);
        println!(
            "{:<24} {:?} {} pts ({} for display), range [{:.2}, {:.2}]",
            s.id,
            s.series_type,
            s.data.len(),
            shown.len(),
            lo,
            hi
        );
    }
    println!(
        "History: {} operation(s), cursor {}, {} event(s) observed",
        editor.history().len(),
        editor.history().cursor(),
        recorder.events().len()
    );

    let reply = publish_series(&source, PUBLISH_PATH, editor.store().iter())?;
    info!("published {} series: {reply}", editor.store().len());

    let out = out_path("history.json");
    let export = editor.export_edit_history();
    let text = serde_json::to_string_pretty(&export)?;
    std::fs::write(&out, text).with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote {}", out.display());

    Ok(())
}

fn report(what: &str, outcome: &EditOutcome) {
    match outcome {
        EditOutcome::Applied { operation_id, warnings } => {
            println!("{what}: applied as {operation_id}");
            for w in warnings {
                warn!("{what}: {w:?}");
            }
        }
        EditOutcome::Skipped(reason) => println!("{what}: skipped ({reason:?})"),
    }
}

/// Output file under target/out/
fn out_path(name: &str) -> PathBuf {
    let mut out = PathBuf::from("target/out");
    std::fs::create_dir_all(&out).ok();
    out.push(name);
    out
}

/// Load `time,value[,id]` rows. Time is either fractional hours or a timestamp.
fn load_csv(path: &Path) -> Result<Vec<SeriesImport>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect::<Vec<_>>();
    println!("Headers: {:?}", headers);

    let idx = |names: &[&str]| -> Option<usize> { headers.iter().position(|h| names.contains(&h.as_str())) };
    let i_time = idx(&["time", "timestamp", "hour", "datetime"]).context("no time column")?;
    let i_value = idx(&["value", "load", "kw", "consumption"]).context("no value column")?;
    let i_id = idx(&["id", "series", "series_id"]);

    let mut grouped: BTreeMap<String, Vec<Sample>> = BTreeMap::new();
    let mut skipped = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let time = rec.get(i_time).and_then(parse_hours);
        let value = rec.get(i_value).and_then(|s| s.trim().parse::<f64>().ok());
        let id = i_id.and_then(|ix| rec.get(ix)).map(str::trim).filter(|s| !s.is_empty()).unwrap_or("load");
        match (time, value) {
            (Some(t), Some(v)) => grouped.entry(id.to_string()).or_default().push(Sample::new(t, v)),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("skipped {skipped} unparsable row(s)");
    }
    Ok(grouped.into_iter().map(|(id, data)| SeriesImport { id, data }).collect())
}

fn parse_hours(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(h) = s.parse::<f64>() {
        return Some(h);
    }
    parse_timestamp(s).ok().map(|t| t.hour_of_day)
}

/// Household-like load with morning and evening peaks, plus a flatter base load.
fn synthetic_day() -> Vec<SeriesImport> {
    let peak = |t: f64, center: f64, width: f64| (-((t - center) / width).powi(2)).exp();
    let load = (0..1440)
        .map(|m| {
            let t = m as f64 / 60.0;
            let v = 20.0 + 25.0 * peak(t, 7.5, 1.2) + 40.0 * peak(t, 19.0, 1.8) + 3.0 * (t * 2.1).sin();
            Sample::new(t, v)
        })
        .collect();
    let base = (0..1440)
        .map(|m| {
            let t = m as f64 / 60.0;
            Sample::new(t, 12.0 + 4.0 * (t / 24.0 * std::f64::consts::TAU).cos())
        })
        .collect();
    vec![SeriesImport { id: "load".into(), data: load }, SeriesImport { id: "base".into(), data: base }]
}

/// Three users, two days each, one reading every five minutes.
fn reference_dataset_json() -> Value {
    let users = (1..=3)
        .map(|u| {
            let data: Vec<Value> = (1..=2)
                .flat_map(|day| {
                    (0..288).map(move |k| {
                        let minutes = k * 5;
                        let t = minutes as f64 / 60.0;
                        let v = 18.0 + 6.0 * u as f64 + 30.0 * (-((t - 8.0 - day as f64 * 0.5) / 1.5).powi(2)).exp();
                        json!({
                            "time": format!("2024-03-{:02} {:02}:{:02}:00", day, minutes / 60, minutes % 60),
                            "value": v,
                        })
                    })
                })
                .collect();
            json!({ "id": format!("user-{u}"), "data": data })
        })
        .collect();
    Value::Array(users)
}

fn minmax(data: &[Sample]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for s in data {
        lo = lo.min(s.value);
        hi = hi.max(s.value);
    }
    (lo, hi)
}
