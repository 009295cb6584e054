//! Training session
//!
//! Holds the state a presentation layer works against: the loaded dataset,
//! the current split and the current model. Each operation checks its
//! prerequisites and reports what is missing.

use boostlab_engine::BoostingEngine;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::TrainerConfig;
use crate::dataset::Dataset;
use crate::errors::{PipelineError, Result};
use crate::export::{save_predictions, PredictionRow};
use crate::model::{Estimator, FitControl, FitReport, Model, TaskKind};
use crate::split::{split, split_rng, Selection, Split};

pub struct Session<E: BoostingEngine> {
    engine: Arc<E>,
    config: TrainerConfig,
    dataset: Option<Dataset>,
    split: Option<Split>,
    model: Option<Model<E>>,
}

impl<E: BoostingEngine> Session<E> {
    pub fn new(engine: Arc<E>, config: TrainerConfig) -> Self {
        Self {
            engine,
            config,
            dataset: None,
            split: None,
            model: None,
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn split(&self) -> Option<&Split> {
        self.split.as_ref()
    }

    pub fn model(&self) -> Option<&Model<E>> {
        self.model.as_ref()
    }

    /// Load a CSV dataset. Any previous split is discarded.
    pub fn load_dataset<P: AsRef<Path>>(&mut self, path: P) -> Result<&Dataset> {
        let dataset = Dataset::from_csv(path.as_ref())?;
        info!(
            "Loaded {} rows, {} columns from {}",
            dataset.row_count(),
            dataset.column_count(),
            path.as_ref().display()
        );
        Ok(self.set_dataset(dataset))
    }

    pub fn set_dataset(&mut self, dataset: Dataset) -> &Dataset {
        self.split = None;
        self.dataset.insert(dataset)
    }

    /// Split the dataset using the configured seed (entropy when unset).
    pub fn compute_split(
        &mut self,
        features: Vec<usize>,
        target: usize,
        stabilizer: Option<usize>,
    ) -> Result<&Split> {
        let mut rng = split_rng(self.config.split.seed);
        self.compute_split_with(Selection::new(features, target, stabilizer), &mut rng)
    }

    pub fn compute_split_with<R: Rng + ?Sized>(&mut self, selection: Selection, rng: &mut R) -> Result<&Split> {
        let dataset = self.dataset.as_ref().ok_or(PipelineError::NoDataset)?;
        let parts = split(dataset, &selection, rng)?;
        Ok(self.split.insert(parts))
    }

    /// Train a new model of kind `task` on the training side of the split.
    pub fn fit(&mut self, task: TaskKind, control: FitControl<'_>) -> Result<FitReport> {
        let split = self.split.as_ref().ok_or(PipelineError::NoSplit)?;

        // Release the old model before building its replacement.
        self.model = None;
        let mut model = Model::new(task, Arc::clone(&self.engine), self.config.params.clone());

        let train = &split.train;
        let report = model.fit(
            &train.features,
            &train.targets,
            train.stabilizer.as_deref(),
            control,
        )?;
        // A cancelled fit still leaves a usable model of fewer rounds.
        self.model = Some(model);

        info!(
            "Training {}: {}/{} rounds",
            if report.cancelled { "cancelled" } else { "finished" },
            report.rounds_completed,
            report.rounds_requested
        );
        Ok(report)
    }

    /// Predict the holdout rows, pairing each prediction with its target.
    pub fn predict(&self) -> Result<Vec<PredictionRow>> {
        let model = self.model.as_ref().ok_or(PipelineError::NoModel)?;
        let split = self.split.as_ref().ok_or(PipelineError::NoSplit)?;
        let test = &split.test;
        if test.is_empty() {
            return Err(PipelineError::InsufficientData(
                "no test data available".to_string(),
            ));
        }

        let preds = model.predict(&test.features)?;
        if preds.len() != test.targets.len() {
            return Err(PipelineError::DimensionMismatch(format!(
                "{} predictions for {} test rows",
                preds.len(),
                test.targets.len()
            )));
        }

        Ok(test
            .targets
            .iter()
            .zip(preds)
            .map(|(&y_true, y_pred)| PredictionRow { y_true, y_pred })
            .collect())
    }

    /// Predict the holdout rows and write them to `path`.
    pub fn export_predictions<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let rows = self.predict()?;
        save_predictions(path, &rows)?;
        Ok(rows.len())
    }

    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let model = self.model.as_ref().ok_or(PipelineError::NoModel)?;
        model.save_model(path.as_ref())
    }

    /// Replace the current model with one loaded from `path`.
    pub fn load_model<P: AsRef<Path>>(&mut self, task: TaskKind, path: P) -> Result<()> {
        self.model = None;
        let mut model = Model::new(task, Arc::clone(&self.engine), self.config.params.clone());
        model.load_model(path.as_ref())?;
        self.model = Some(model);
        Ok(())
    }
}
