//! Randomized train/holdout split
//!
//! Row indices are uniformly permuted and the first `floor(0.66 * N)` go to
//! training, the rest to the holdout set.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::dataset::Dataset;
use crate::errors::{PipelineError, Result};

/// Fraction of rows assigned to training.
pub const TRAIN_RATIO: f64 = 0.66;

/// Columns chosen for a training run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Feature columns, in the order they are fed to the model
    pub features: Vec<usize>,
    pub target: usize,
    pub stabilizer: Option<usize>,
}

impl Selection {
    pub fn new(features: Vec<usize>, target: usize, stabilizer: Option<usize>) -> Self {
        Self {
            features,
            target,
            stabilizer,
        }
    }

    /// Resolve column names against a dataset header.
    pub fn by_name(
        dataset: &Dataset,
        features: &[&str],
        target: &str,
        stabilizer: Option<&str>,
    ) -> Result<Self> {
        let lookup = |name: &str| {
            dataset
                .column_index(name)
                .ok_or_else(|| PipelineError::InvalidSelection(format!("unknown column `{name}`")))
        };

        Ok(Self {
            features: features.iter().map(|f| lookup(f)).collect::<Result<_>>()?,
            target: lookup(target)?,
            stabilizer: stabilizer.map(lookup).transpose()?,
        })
    }

    pub fn validate(&self, column_count: usize) -> Result<()> {
        if self.features.is_empty() {
            return Err(PipelineError::InvalidSelection(
                "select at least one feature".to_string(),
            ));
        }

        let out_of_range = self
            .features
            .iter()
            .copied()
            .chain(std::iter::once(self.target))
            .chain(self.stabilizer)
            .find(|&idx| idx >= column_count);
        if let Some(idx) = out_of_range {
            return Err(PipelineError::InvalidSelection(format!(
                "column {idx} does not exist ({column_count} columns)"
            )));
        }

        Ok(())
    }
}

/// Rows of one side of the split.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partition {
    /// Original dataset row indices, in permuted order
    pub rows: Vec<usize>,
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
    /// Present only when a stabilizer column was selected
    pub stabilizer: Option<Vec<f32>>,
}

impl Partition {
    fn with_capacity(n: usize, with_stabilizer: bool) -> Self {
        Self {
            rows: Vec::with_capacity(n),
            features: Vec::with_capacity(n),
            targets: Vec::with_capacity(n),
            stabilizer: with_stabilizer.then(|| Vec::with_capacity(n)),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn push(&mut self, dataset: &Dataset, selection: &Selection, row: usize) {
        let values = &dataset.rows[row];
        self.rows.push(row);
        self.features
            .push(selection.features.iter().map(|&f| values[f]).collect());
        self.targets.push(values[selection.target]);
        if let (Some(stabilizer), Some(col)) = (self.stabilizer.as_mut(), selection.stabilizer) {
            stabilizer.push(values[col] as f32);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Split {
    pub train: Partition,
    pub test: Partition,
}

/// Number of training rows for a dataset of `n` rows.
pub fn train_count(n: usize) -> usize {
    (n as f64 * TRAIN_RATIO).floor() as usize
}

/// Split `dataset` using the caller's random source.
pub fn split<R: Rng + ?Sized>(dataset: &Dataset, selection: &Selection, rng: &mut R) -> Result<Split> {
    let n = dataset.row_count();
    if n < 2 {
        return Err(PipelineError::InsufficientData(format!(
            "need at least 2 rows to split, got {n}"
        )));
    }
    selection.validate(dataset.column_count())?;

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let cut = train_count(n);
    let with_stabilizer = selection.stabilizer.is_some();
    let mut train = Partition::with_capacity(cut, with_stabilizer);
    let mut test = Partition::with_capacity(n - cut, with_stabilizer);

    for (i, &row) in indices.iter().enumerate() {
        let side = if i < cut { &mut train } else { &mut test };
        side.push(dataset, selection, row);
    }

    tracing::info!("split {} rows into {} train / {} test", n, train.len(), test.len());
    Ok(Split { train, test })
}

/// Random source for a split: seeded when a seed is configured, otherwise
/// drawn from OS entropy.
pub fn split_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
