//! Error types for the wksync_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to turn raw JSON into a [`WorkoutPlanDocument`](crate::WorkoutPlanDocument).
///
/// Interval-level variants carry the zero-based position of the offending
/// element in the top-level `intervals` array.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Input is not well-formed JSON
    #[error("invalid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    /// Document envelope is mistyped or lacks `title`, `sportType` or `intervals`
    #[error("malformed workout document: {0}")]
    Document(#[source] serde_json::Error),

    #[error("interval {index}: expected a JSON object")]
    NotAnObject { index: usize },

    /// `kind` is present but is not a string
    #[error("interval {index}: `kind` must be a string")]
    InvalidKind { index: usize },

    #[error("interval {index}: missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("interval {index}: repeat count must be at least 1, got {reps}")]
    InvalidRepetitions { index: usize, reps: i64 },

    /// A present field has the wrong type or range
    #[error("interval {index}: {source}")]
    Interval {
        index: usize,
        source: serde_json::Error,
    },
}

impl DecodeError {
    /// Classify an envelope-level serde error into syntax vs. shape failure.
    pub(crate) fn from_envelope(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Data => DecodeError::Document(err),
            Category::Syntax | Category::Eof | Category::Io => DecodeError::Syntax(err),
        }
    }
}

/// Failure to restructure a decoded document into an execution plan.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Sport tag has no activity mapping and strict mapping is enabled
    #[error("unknown sport type: {0:?}")]
    UnknownSportType(String),
}

/// Core error type for wksync_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error outside of plan decoding
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid schedule time supplied by a caller
    #[error("Schedule error: {0}")]
    Schedule(String),

    /// Plan store failure
    #[error("Store error: {0}")]
    Store(String),
}
