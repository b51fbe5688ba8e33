// File: crates/curve-core/src/error.rs
// Summary: Error type for the ingestion and configuration boundaries.
// Notes:
// - Edit operations never fail; they report `EditOutcome::Skipped` instead.

pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid timestamp '{0}'")]
    Timestamp(String),

    #[error("malformed dataset: {0}")]
    Dataset(String),

    #[error("malformed decomposition payload: {0}")]
    Decomposition(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("data source error: {0}")]
    Source(String),
}
