//! Engine plumbing shared by every estimator

use boostlab_engine::{BoostingEngine, EngineResult, InfoField};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::{FitControl, FitReport};
use crate::errors::{PipelineError, Result};
use crate::params::BoostParams;

/// Marker for missing cells when handing features to the engine. NaN never
/// collides with a real feature value.
const MISSING: f32 = f32::NAN;

/// Convert a failing engine status into [`PipelineError::EngineFailure`]
/// carrying the engine's last error message.
fn check<E: BoostingEngine, T>(engine: &E, result: EngineResult<T>) -> Result<T> {
    result.map_err(|status| {
        let message = engine.last_error();
        warn!("{} from engine: {}", status, message);
        PipelineError::EngineFailure(message)
    })
}

/// Reject NaN or infinite targets before they reach the engine.
pub(crate) fn check_targets(targets: &[f64]) -> Result<()> {
    match targets.iter().position(|t| !t.is_finite()) {
        Some(row) => Err(PipelineError::MalformedInput(format!(
            "target at training row {row} is {}",
            targets[row]
        ))),
        None => Ok(()),
    }
}

/// Owns the booster handle and the training matrix it was bound to.
///
/// At most one booster is live at a time: the previous handle is dropped
/// before a replacement is created.
pub struct BoosterCore<E: BoostingEngine> {
    engine: Arc<E>,
    params: BoostParams,
    booster: Option<E::Booster>,
    train_matrix: Option<E::Matrix>,
    /// Feature count of the trained model; unknown after a load.
    n_features: Option<usize>,
}

impl<E: BoostingEngine> BoosterCore<E> {
    pub fn new(engine: Arc<E>, params: BoostParams) -> Self {
        Self {
            engine,
            params,
            booster: None,
            train_matrix: None,
            n_features: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.booster.is_some()
    }

    /// Drop the booster, then the matrix it references.
    pub fn release(&mut self) {
        self.booster = None;
        self.train_matrix = None;
        self.n_features = None;
    }

    /// Flatten feature rows into an engine matrix, rejecting empty or
    /// jagged input.
    fn build_matrix(&self, features: &[Vec<f64>]) -> Result<(E::Matrix, usize)> {
        let n_rows = features.len();
        if n_rows == 0 {
            return Err(PipelineError::DimensionMismatch(
                "empty feature matrix".to_string(),
            ));
        }

        let n_features = features[0].len();
        if n_features == 0 {
            return Err(PipelineError::DimensionMismatch(
                "feature rows have no columns".to_string(),
            ));
        }

        let mut flat = Vec::with_capacity(n_rows * n_features);
        for (i, row) in features.iter().enumerate() {
            if row.len() != n_features {
                return Err(PipelineError::DimensionMismatch(format!(
                    "inconsistent feature size: row {i} has {} values, expected {n_features}",
                    row.len()
                )));
            }
            flat.extend(row.iter().map(|&v| v as f32));
        }

        let matrix = check(
            self.engine.as_ref(),
            self.engine.matrix_from_dense(&flat, n_rows, n_features, MISSING),
        )?;
        Ok((matrix, n_features))
    }

    /// Train a new booster on `features`/`labels` and run the boosting loop.
    pub fn train(
        &mut self,
        features: &[Vec<f64>],
        labels: &[f32],
        weights: Option<&[f32]>,
        objective: &str,
        num_class: Option<usize>,
        mut control: FitControl<'_>,
    ) -> Result<FitReport> {
        self.params.validate()?;

        let (mut matrix, n_features) = self.build_matrix(features)?;
        if labels.len() != features.len() {
            return Err(PipelineError::DimensionMismatch(format!(
                "{} targets for {} feature rows",
                labels.len(),
                features.len()
            )));
        }

        let engine = Arc::clone(&self.engine);
        let engine = engine.as_ref();
        check(engine, engine.set_float_info(&mut matrix, InfoField::Label, labels))?;
        if let Some(weights) = weights {
            check(engine, engine.set_float_info(&mut matrix, InfoField::Weight, weights))?;
        }

        self.release();
        let mut booster = check(engine, engine.create_booster(&[&matrix]))?;
        for (key, value) in self.params.to_engine_params(objective, num_class) {
            check(engine, engine.set_param(&mut booster, &key, &value))?;
        }

        self.n_features = Some(n_features);
        let booster = self.booster.insert(booster);
        let matrix = self.train_matrix.insert(matrix);

        let total = self.params.num_boost_round;
        info!(
            "training {} on {} rows x {} features for {} rounds",
            objective,
            features.len(),
            n_features,
            total
        );

        for i in 0..total {
            if control.is_cancelled() {
                warn!("Training was terminated by user after {} of {} rounds", i, total);
                return Ok(FitReport {
                    rounds_completed: i,
                    rounds_requested: total,
                    cancelled: true,
                });
            }
            check(engine, engine.update_one_iter(booster, i, matrix))?;
            control.report(i + 1, total);
        }

        Ok(FitReport {
            rounds_completed: total,
            rounds_requested: total,
            cancelled: false,
        })
    }

    /// Raw engine output for `features`, one value per row.
    pub fn predict_raw(&self, features: &[Vec<f64>]) -> Result<Vec<f32>> {
        let booster = self.booster.as_ref().ok_or(PipelineError::NoModel)?;
        let (matrix, n_features) = self.build_matrix(features)?;
        if let Some(expected) = self.n_features.filter(|&n| n != n_features) {
            return Err(PipelineError::DimensionMismatch(format!(
                "model was trained on {expected} features, got {n_features}"
            )));
        }

        let output = check(self.engine.as_ref(), self.engine.predict(booster, &matrix))?;
        if output.len() != features.len() {
            return Err(PipelineError::DimensionMismatch(format!(
                "engine returned {} predictions for {} rows",
                output.len(),
                features.len()
            )));
        }
        Ok(output)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let booster = self.booster.as_ref().ok_or(PipelineError::NoModel)?;
        check(self.engine.as_ref(), self.engine.save_model(booster, path))?;
        info!("Model saved to {}", path.display());
        Ok(())
    }

    /// Replace the current model with one loaded from `path`.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.release();

        let engine = self.engine.as_ref();
        let mut booster = check(engine, engine.create_booster(&[]))?;
        check(engine, engine.load_model(&mut booster, path))?;

        self.booster = Some(booster);
        info!("Model loaded from {}", path.display());
        Ok(())
    }
}
