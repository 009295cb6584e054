use boostlab_engine::BoostingEngine;
use std::path::Path;
use std::sync::Arc;

use super::base::{check_targets, BoosterCore};
use super::{Estimator, FitControl, FitReport, TaskKind, REGRESSION_OBJECTIVE};
use crate::errors::Result;
use crate::params::BoostParams;

/// Squared-error regression.
pub struct Regressor<E: BoostingEngine> {
    core: BoosterCore<E>,
}

impl<E: BoostingEngine> Regressor<E> {
    pub fn new(engine: Arc<E>, params: BoostParams) -> Self {
        Self {
            core: BoosterCore::new(engine, params),
        }
    }
}

impl<E: BoostingEngine> Estimator for Regressor<E> {
    fn task(&self) -> TaskKind {
        TaskKind::Regression
    }

    fn fit(
        &mut self,
        features: &[Vec<f64>],
        targets: &[f64],
        stabilizer: Option<&[f32]>,
        control: FitControl<'_>,
    ) -> Result<FitReport> {
        check_targets(targets)?;
        if stabilizer.is_some() {
            tracing::debug!("stabilizer ignored for regression");
        }

        let labels: Vec<f32> = targets.iter().map(|&y| y as f32).collect();
        self.core
            .train(features, &labels, None, REGRESSION_OBJECTIVE, None, control)
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Option<f64>>> {
        let raw = self.core.predict_raw(features)?;
        Ok(raw.into_iter().map(|v| Some(v as f64)).collect())
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        self.core.save(path)
    }

    fn load_model(&mut self, path: &Path) -> Result<()> {
        self.core.load(path)
    }

    fn is_trained(&self) -> bool {
        self.core.is_trained()
    }
}
