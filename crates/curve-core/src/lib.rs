// File: crates/curve-core/src/lib.rs
// Summary: Core library entry point; exports the curve editing, pattern matching and history API.

pub mod config;
pub mod dataset;
pub mod decomposition;
pub mod downsample;
pub mod edit;
pub mod editor;
pub mod error;
pub mod events;
pub mod grid;
pub mod history;
pub mod pattern;
pub mod scale;
pub mod selection;
pub mod series;
pub mod source;
pub mod store;
pub mod types;

pub use config::{EditorConfig, MatcherConfig, SimilarityWeights};
pub use dataset::{parse_timestamp, ParsedTimestamp, ReferenceDataset};
pub use downsample::{lttb, prepare_for_display};
pub use edit::{CurveMode, Offset};
pub use editor::{EditOutcome, EditWarning, Editor, SeriesImport, SkipReason};
pub use error::{EditorError, Result};
pub use events::{EditEvent, EditObserver, EventRecorder};
pub use grid::{regrid, value_at};
pub use history::{EditHistoryExport, HistoryLog, Operation, OperationKind, OperationParams};
pub use pattern::{Pattern, PatternMatcher};
pub use scale::CurvePoint;
pub use selection::{Selection, TimeRange};
pub use series::{Sample, Series, SeriesType};
pub use source::{DataSource, MemorySource};
pub use store::SeriesStore;
pub use types::ValueDomain;
