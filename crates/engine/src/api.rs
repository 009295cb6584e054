//! Engine contract
//!
//! Every call returns `Ok` or a non-zero [`EngineStatus`]. Callers fetch the
//! human-readable reason with [`BoostingEngine::last_error`] right after a
//! failing call, the same way a C caller would query the library's
//! thread-local error string.

use std::fmt;
use std::path::Path;

/// Non-zero status code returned by a failing engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStatus(i32);

impl EngineStatus {
    /// Generic failure code used by [`NativeEngine`](crate::NativeEngine).
    pub const FAILURE: Self = Self(-1);

    /// Wrap a raw status. Returns `None` for the success code `0`.
    pub fn from_code(code: i32) -> Option<Self> {
        (code != 0).then_some(Self(code))
    }

    pub fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine status {}", self.0)
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineStatus>;

/// Row-aligned float metadata that can be attached to a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoField {
    Label,
    Weight,
}

impl InfoField {
    pub fn as_str(self) -> &'static str {
        match self {
            InfoField::Label => "label",
            InfoField::Weight => "weight",
        }
    }
}

impl fmt::Display for InfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle-oriented boosting engine.
///
/// `Matrix` and `Booster` are owned handles; dropping them releases the
/// underlying resources.
pub trait BoostingEngine {
    type Matrix;
    type Booster;

    /// Build a matrix from row-major dense values. Cells equal to `missing`
    /// (or NaN) are treated as missing.
    fn matrix_from_dense(
        &self,
        data: &[f32],
        rows: usize,
        cols: usize,
        missing: f32,
    ) -> EngineResult<Self::Matrix>;

    /// Attach row-aligned metadata (labels or weights) to a matrix.
    fn set_float_info(
        &self,
        matrix: &mut Self::Matrix,
        field: InfoField,
        values: &[f32],
    ) -> EngineResult<()>;

    /// Create a booster whose shape is taken from the cached matrices.
    /// An empty cache yields a booster meant for [`load_model`](Self::load_model).
    fn create_booster(&self, cache: &[&Self::Matrix]) -> EngineResult<Self::Booster>;

    fn set_param(&self, booster: &mut Self::Booster, key: &str, value: &str) -> EngineResult<()>;

    /// Run one boosting round against `train`.
    fn update_one_iter(
        &self,
        booster: &mut Self::Booster,
        iteration: usize,
        train: &Self::Matrix,
    ) -> EngineResult<()>;

    fn predict(&self, booster: &Self::Booster, matrix: &Self::Matrix) -> EngineResult<Vec<f32>>;

    fn save_model(&self, booster: &Self::Booster, path: &Path) -> EngineResult<()>;

    fn load_model(&self, booster: &mut Self::Booster, path: &Path) -> EngineResult<()>;

    /// Message describing the most recent failure.
    fn last_error(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_code() {
        assert_eq!(EngineStatus::from_code(0), None);
        assert_eq!(EngineStatus::from_code(-1), Some(EngineStatus::FAILURE));
        assert_eq!(EngineStatus::from_code(7).map(EngineStatus::code), Some(7));
    }

    #[test]
    fn test_info_field_names() {
        assert_eq!(InfoField::Label.to_string(), "label");
        assert_eq!(InfoField::Weight.as_str(), "weight");
    }
}
