// File: crates/curve-core/src/config.rs
// Summary: Editor and pattern-matcher settings with defaults; loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::edit::CurveMode;
use crate::error::{EditorError, Result};
use crate::types::ValueDomain;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Capacity of the undo/redo journal.
    pub max_history: usize,
    pub domain: ValueDomain,
    /// Width (hours) of the eased blend zones outside an edited window.
    pub transition_hours: f64,
    pub curve_mode: CurveMode,
    pub matcher: MatcherConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: 50,
            domain: ValueDomain::Simple,
            transition_hours: 0.5,
            curve_mode: CurveMode::NormalizeRemap,
            matcher: MatcherConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse TOML; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: EditorConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| EditorError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_history == 0 {
            return Err(EditorError::Config("max_history must be at least 1".into()));
        }
        if !(self.transition_hours >= 0.0) {
            return Err(EditorError::Config("transition_hours must be >= 0".into()));
        }
        self.matcher.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Candidates must score strictly above this.
    pub similarity_floor: f64,
    /// Result count when searching the working set.
    pub top_k: usize,
    /// Result count when searching a reference dataset.
    pub dataset_top_k: usize,
    /// Points used to compare window shapes.
    pub shape_samples: usize,
    pub weights: SimilarityWeights,
    /// Boundary difference at which boundary similarity reaches 0.
    /// Defaults to the width of the value domain.
    pub boundary_saturation: Option<f64>,
    /// Day groups with fewer points are skipped.
    pub min_day_points: usize,
    /// Include shape similarity (boundary-only scoring when false).
    pub use_shape: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_floor: 0.7,
            top_k: 5,
            dataset_top_k: 10,
            shape_samples: 100,
            weights: SimilarityWeights::default(),
            boundary_saturation: None,
            min_day_points: 100,
            use_shape: true,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.shape_samples < 2 {
            return Err(EditorError::Config("shape_samples must be at least 2".into()));
        }
        if let Some(s) = self.boundary_saturation {
            if !(s > 0.0) {
                return Err(EditorError::Config("boundary_saturation must be positive".into()));
            }
        }
        let w = &self.weights;
        if w.left < 0.0 || w.right < 0.0 || w.shape < 0.0 || w.left + w.right <= 0.0 {
            return Err(EditorError::Config("similarity weights must be non-negative with a boundary component".into()));
        }
        Ok(())
    }
}

/// Relative weights of the similarity components; scores are divided by the
/// sum of the weights in use so they stay in [0,1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub left: f64,
    pub right: f64,
    pub shape: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self { left: 0.15, right: 0.15, shape: 0.7 }
    }
}
