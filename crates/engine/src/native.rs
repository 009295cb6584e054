//! Pure-Rust implementation of the [`BoostingEngine`] contract

use parking_lot::Mutex;
use std::path::Path;

use crate::api::{BoostingEngine, EngineResult, EngineStatus, InfoField};
use crate::booster::NativeBooster;
use crate::errors::EngineError;
use crate::matrix::DenseMatrix;

/// Native gradient boosting engine.
///
/// Holds only the last-error slot, so one engine can be shared across
/// threads and sessions.
#[derive(Debug, Default)]
pub struct NativeEngine {
    last_error: Mutex<String>,
}

impl NativeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure as the last error and map it to a status code.
    fn guard<T>(&self, result: Result<T, EngineError>) -> EngineResult<T> {
        result.map_err(|err| {
            tracing::debug!("engine call failed: {}", err);
            *self.last_error.lock() = err.to_string();
            EngineStatus::FAILURE
        })
    }
}

impl BoostingEngine for NativeEngine {
    type Matrix = DenseMatrix;
    type Booster = NativeBooster;

    fn matrix_from_dense(
        &self,
        data: &[f32],
        rows: usize,
        cols: usize,
        missing: f32,
    ) -> EngineResult<DenseMatrix> {
        self.guard(DenseMatrix::from_dense(data, rows, cols, missing))
    }

    fn set_float_info(
        &self,
        matrix: &mut DenseMatrix,
        field: InfoField,
        values: &[f32],
    ) -> EngineResult<()> {
        self.guard(matrix.set_info(field, values))
    }

    fn create_booster(&self, cache: &[&DenseMatrix]) -> EngineResult<NativeBooster> {
        self.guard(NativeBooster::with_cache(cache))
    }

    fn set_param(&self, booster: &mut NativeBooster, key: &str, value: &str) -> EngineResult<()> {
        self.guard(booster.set_param(key, value))
    }

    fn update_one_iter(
        &self,
        booster: &mut NativeBooster,
        iteration: usize,
        train: &DenseMatrix,
    ) -> EngineResult<()> {
        self.guard(booster.update(iteration, train))
    }

    fn predict(&self, booster: &NativeBooster, matrix: &DenseMatrix) -> EngineResult<Vec<f32>> {
        self.guard(booster.predict(matrix))
    }

    fn save_model(&self, booster: &NativeBooster, path: &Path) -> EngineResult<()> {
        self.guard(booster.save(path))
    }

    fn load_model(&self, booster: &mut NativeBooster, path: &Path) -> EngineResult<()> {
        self.guard(booster.load(path))
    }

    fn last_error(&self) -> String {
        self.last_error.lock().clone()
    }
}
