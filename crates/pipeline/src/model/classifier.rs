use boostlab_engine::BoostingEngine;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use super::base::{check_targets, BoosterCore};
use super::{Estimator, FitControl, FitReport, TaskKind, CLASSIFICATION_OBJECTIVE};
use crate::errors::Result;
use crate::labels::LabelCodec;
use crate::params::BoostParams;
use crate::weights::derive_weights;

/// Sidecar file holding a classifier's label set next to its model file.
pub fn labels_path(model_path: &Path) -> PathBuf {
    let mut name = OsString::from(model_path.as_os_str());
    name.push(".labels.json");
    PathBuf::from(name)
}

/// Multi-class softmax classifier over arbitrary numeric labels.
pub struct Classifier<E: BoostingEngine> {
    core: BoosterCore<E>,
    codec: LabelCodec,
}

impl<E: BoostingEngine> Classifier<E> {
    pub fn new(engine: Arc<E>, params: BoostParams) -> Self {
        Self {
            core: BoosterCore::new(engine, params),
            codec: LabelCodec::new(),
        }
    }

    pub fn codec(&self) -> &LabelCodec {
        &self.codec
    }
}

impl<E: BoostingEngine> Estimator for Classifier<E> {
    fn task(&self) -> TaskKind {
        TaskKind::Classification
    }

    fn fit(
        &mut self,
        features: &[Vec<f64>],
        targets: &[f64],
        stabilizer: Option<&[f32]>,
        control: FitControl<'_>,
    ) -> Result<FitReport> {
        check_targets(targets)?;
        let codes = self.codec.encode(targets);
        let weights = derive_weights(codes.len(), stabilizer);
        tracing::info!(
            "{} classes, sample weights {}",
            self.codec.num_classes(),
            if weights.is_some() { "from stabilizer" } else { "uniform" }
        );

        self.core.train(
            features,
            &codes,
            weights.as_deref(),
            CLASSIFICATION_OBJECTIVE,
            Some(self.codec.num_classes()),
            control,
        )
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Option<f64>>> {
        let raw = self.core.predict_raw(features)?;
        Ok(self.codec.decode(&raw))
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        self.core.save(path)?;
        std::fs::write(labels_path(path), serde_json::to_string(&self.codec)?)?;
        Ok(())
    }

    fn load_model(&mut self, path: &Path) -> Result<()> {
        // Nothing from the previous model survives a load, failed or not.
        self.core.release();
        self.codec = LabelCodec::new();

        let sidecar = labels_path(path);
        let codec = if sidecar.exists() {
            let stored: LabelCodec = serde_json::from_str(&std::fs::read_to_string(&sidecar)?)?;
            LabelCodec::from_classes(stored.classes().to_vec())
        } else {
            warn!(
                "no label file at {}; class predictions cannot be decoded",
                sidecar.display()
            );
            LabelCodec::new()
        };

        self.core.load(path)?;
        self.codec = codec;
        Ok(())
    }

    fn is_trained(&self) -> bool {
        self.core.is_trained()
    }
}
