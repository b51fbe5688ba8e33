// File: crates/curve-core/src/decomposition.rs
// Summary: Turns a frequency-decomposition payload into a parent series with LF/MF/HF components.

use serde_json::Value;

use crate::dataset::parse_timestamp;
use crate::error::{EditorError, Result};
use crate::grid;
use crate::series::{Sample, Series, SeriesType};

const COMPONENTS: &[(&str, &str, SeriesType)] = &[
    ("low_freq", "LF", SeriesType::LowFrequency),
    ("mid_freq", "MF", SeriesType::MidFrequency),
    ("high_freq", "HF", SeriesType::HighFrequency),
];

fn json_array<'a>(payload: &'a Value, key: &str) -> Result<Option<&'a Vec<Value>>> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(a)) => Ok(Some(a)),
        Some(_) => Err(EditorError::Decomposition(format!("'{key}' is not an array"))),
    }
}

fn to_samples(hours: &[f64], values: &[Value]) -> Vec<Sample> {
    hours
        .iter()
        .zip(values)
        .filter_map(|(t, v)| v.as_f64().map(|v| Sample::new(*t, v)))
        .collect()
}

/// Parse `{timestamp, original, low_freq, high_freq[, mid_freq]}`.
///
/// Returns the `original` series with id `base_id` first, followed by one
/// component per frequency band present (`{base_id}_LF`, ...), each with
/// `parent_id = base_id`. All data is regridded; null values are skipped.
pub fn parse_decomposition(payload: &Value, base_id: &str) -> Result<Vec<Series>> {
    let stamps = json_array(payload, "timestamp")?
        .ok_or_else(|| EditorError::Decomposition("missing 'timestamp'".into()))?;
    let hours = stamps
        .iter()
        .map(|s| -> Result<f64> {
            let text = s
                .as_str()
                .ok_or_else(|| EditorError::Decomposition(format!("timestamp {s} is not a string")))?;
            Ok(parse_timestamp(text)?.hour_of_day)
        })
        .collect::<Result<Vec<f64>>>()?;

    let original = json_array(payload, "original")?
        .ok_or_else(|| EditorError::Decomposition("missing 'original'".into()))?;
    if original.len() != hours.len() {
        return Err(EditorError::Decomposition(format!(
            "'original' has {} values for {} timestamps",
            original.len(),
            hours.len()
        )));
    }

    let mut out = vec![Series::with_data(base_id, SeriesType::Original, grid::regrid(&to_samples(&hours, original)))];
    for (key, suffix, kind) in COMPONENTS {
        let Some(values) = json_array(payload, key)? else { continue };
        if values.len() != hours.len() {
            return Err(EditorError::Decomposition(format!(
                "'{key}' has {} values for {} timestamps",
                values.len(),
                hours.len()
            )));
        }
        let data = grid::regrid(&to_samples(&hours, values));
        out.push(Series::with_data(format!("{base_id}_{suffix}"), *kind, data).with_parent(base_id));
    }
    Ok(out)
}
