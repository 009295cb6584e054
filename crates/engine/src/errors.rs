use thiserror::Error;

/// Errors raised inside the native engine.
///
/// These never cross the [`BoostingEngine`](crate::BoostingEngine) boundary
/// directly: the engine records the message as its last error and returns a
/// non-zero status instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid value `{value}` for parameter `{key}`")]
    InvalidParameter { key: String, value: String },

    #[error("unknown objective `{0}`")]
    UnknownObjective(String),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("labels are not set on the training matrix")]
    MissingLabels,

    #[error("label {label} at row {row} is outside [0, {num_class})")]
    LabelOutOfRange {
        row: usize,
        label: f32,
        num_class: usize,
    },

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("model hash mismatch: expected {expected}, found {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
