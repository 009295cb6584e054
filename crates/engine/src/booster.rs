//! Native booster: parameter state plus the tree ensemble it grows

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::cart::{CartBuilder, TreeConfig};
use crate::errors::EngineError;
use crate::matrix::DenseMatrix;
use crate::objective::Objective;
use crate::params::BoosterParams;
use crate::serialization;
use crate::tree::Tree;

/// Trained tree ensemble.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ensemble {
    pub objective: Objective,
    pub num_class: usize,
    pub num_feature: usize,
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl Ensemble {
    fn empty(params: &BoosterParams, num_feature: usize) -> Self {
        Self {
            objective: params.objective,
            num_class: params.groups(),
            num_feature,
            base_score: params.base_score,
            trees: Vec::new(),
        }
    }

    pub fn groups(&self) -> usize {
        if self.objective.is_multiclass() {
            self.num_class
        } else {
            1
        }
    }

    pub fn rounds(&self) -> usize {
        self.trees.len() / self.groups().max(1)
    }

    /// Raw margins, row-major with `groups()` entries per row.
    pub fn margins(&self, matrix: &DenseMatrix) -> Vec<f64> {
        let groups = self.groups();
        let mut margins = vec![self.base_score; matrix.rows() * groups];

        for row in 0..matrix.rows() {
            let features = matrix.row(row);
            for tree in &self.trees {
                margins[row * groups + tree.group] += tree.evaluate(features) as f64;
            }
        }

        margins
    }

    pub fn predict(&self, matrix: &DenseMatrix) -> Vec<f32> {
        let groups = self.groups();
        let margins = self.margins(matrix);
        let mut out = Vec::with_capacity(matrix.rows());

        for row in margins.chunks(groups) {
            self.objective.transform(row, &mut out);
        }

        out
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| EngineError::UnsupportedFormat(format!("tree {i}: {e}")))?;
            if tree.group >= self.groups() {
                return Err(EngineError::UnsupportedFormat(format!(
                    "tree {i} targets group {} of {}",
                    tree.group,
                    self.groups()
                )));
            }
        }
        Ok(())
    }
}

/// Booster handle of the native engine.
#[derive(Debug, Default)]
pub struct NativeBooster {
    raw_params: BTreeMap<String, String>,
    num_feature: Option<usize>,
    model: Option<Ensemble>,
}

impl NativeBooster {
    pub(crate) fn with_cache(cache: &[&DenseMatrix]) -> Result<Self, EngineError> {
        let mut num_feature = None;
        for matrix in cache {
            match num_feature {
                None => num_feature = Some(matrix.cols()),
                Some(cols) if cols != matrix.cols() => {
                    return Err(EngineError::DimensionMismatch(format!(
                        "cached matrices disagree on feature count ({cols} vs {})",
                        matrix.cols()
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            num_feature,
            ..Self::default()
        })
    }

    pub(crate) fn set_param(&mut self, key: &str, value: &str) -> Result<(), EngineError> {
        // Validate eagerly so a bad value surfaces at the call that set it.
        BoosterParams::default().apply(key, value)?;
        self.raw_params.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.raw_params
    }

    pub fn model(&self) -> Option<&Ensemble> {
        self.model.as_ref()
    }

    /// Run one boosting round: one tree per output group.
    pub(crate) fn update(&mut self, iteration: usize, train: &DenseMatrix) -> Result<(), EngineError> {
        let params = BoosterParams::from_map(&self.raw_params)?;
        let labels = train.labels().ok_or(EngineError::MissingLabels)?;

        if params.objective.is_multiclass() {
            for (row, &label) in labels.iter().enumerate() {
                if label < 0.0 || label.fract() != 0.0 || label as usize >= params.num_class {
                    return Err(EngineError::LabelOutOfRange {
                        row,
                        label,
                        num_class: params.num_class,
                    });
                }
            }
        }

        let num_feature = *self.num_feature.get_or_insert(train.cols());
        if num_feature != train.cols() {
            return Err(EngineError::DimensionMismatch(format!(
                "booster expects {num_feature} features, training matrix has {}",
                train.cols()
            )));
        }

        let model = self
            .model
            .get_or_insert_with(|| Ensemble::empty(&params, num_feature));
        if model.objective != params.objective || model.groups() != params.groups() {
            return Err(EngineError::DimensionMismatch(format!(
                "booster was trained as {} with {} groups, parameters now ask for {} with {}",
                model.objective,
                model.groups(),
                params.objective,
                params.groups()
            )));
        }

        let groups = model.groups();
        let margins = model.margins(train);
        let config = TreeConfig {
            max_depth: params.max_depth,
            min_child_weight: params.min_child_weight,
            lambda: params.lambda,
            eta: params.eta,
        };

        for group in 0..groups {
            let (gradients, hessians) =
                params
                    .objective
                    .gradients(labels, train.weights(), &margins, groups, group);
            let tree = CartBuilder::new(train, &gradients, &hessians, config.clone()).build(group);
            model.trees.push(tree);
        }

        tracing::debug!(
            "round {} complete: {} trees in ensemble",
            iteration + 1,
            model.trees.len()
        );
        Ok(())
    }

    pub(crate) fn predict(&self, matrix: &DenseMatrix) -> Result<Vec<f32>, EngineError> {
        let num_feature = self.num_feature.unwrap_or(matrix.cols());
        if num_feature != matrix.cols() {
            return Err(EngineError::DimensionMismatch(format!(
                "booster expects {num_feature} features, got {}",
                matrix.cols()
            )));
        }

        match &self.model {
            Some(model) => Ok(model.predict(matrix)),
            None => {
                let params = BoosterParams::from_map(&self.raw_params)?;
                Ok(Ensemble::empty(&params, num_feature).predict(matrix))
            }
        }
    }

    pub(crate) fn save(&self, path: &Path) -> Result<(), EngineError> {
        let params = BoosterParams::from_map(&self.raw_params)?;
        let model = match &self.model {
            Some(model) => model.clone(),
            None => Ensemble::empty(&params, self.num_feature.unwrap_or(0)),
        };
        // Never write a file that load would refuse.
        model.validate()?;
        serialization::save_model(path, &model, &self.raw_params)
    }

    pub(crate) fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        let (model, params) = serialization::load_model(path)?;
        self.num_feature = Some(model.num_feature);
        self.raw_params.extend(params);
        self.model = Some(model);
        Ok(())
    }
}
