//! Error types for the training pipeline

use thiserror::Error;

/// Errors surfaced to the presentation layer.
///
/// Two data policies are not errors: an unparseable CSV field
/// reads as `0.0`, and a class code outside the trained label set decodes to
/// `None`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Header/row field-count mismatch or an empty file
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Too few rows to split
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Empty or jagged feature matrix, or output length disagreeing with input
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Non-zero status from the boosting engine, with its last error message
    #[error("boosting engine failure: {0}")]
    EngineFailure(String),

    /// Operation requires a trained or loaded model
    #[error("no model: train or load a model first")]
    NoModel,

    #[error("no dataset loaded")]
    NoDataset,

    #[error("no train/test split computed")]
    NoSplit,

    #[error("invalid column selection: {0}")]
    InvalidSelection(String),

    #[error("invalid value `{value}` for `{key}`")]
    InvalidParameter { key: String, value: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
