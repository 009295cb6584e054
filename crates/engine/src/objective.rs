//! Training objectives and their gradient statistics

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::EngineError;

const MIN_HESSIAN: f64 = 1e-16;

/// Supported objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    #[serde(rename = "reg:squarederror")]
    SquaredError,
    /// Multi-class, predicts the class index.
    #[serde(rename = "multi:softmax")]
    Softmax,
    /// Multi-class, predicts per-class probabilities.
    #[serde(rename = "multi:softprob")]
    Softprob,
}

impl Objective {
    pub fn as_str(self) -> &'static str {
        match self {
            Objective::SquaredError => "reg:squarederror",
            Objective::Softmax => "multi:softmax",
            Objective::Softprob => "multi:softprob",
        }
    }

    pub fn is_multiclass(self) -> bool {
        !matches!(self, Objective::SquaredError)
    }

    /// Gradient and hessian of every row for output group `group`.
    ///
    /// `margins` is row-major with `groups` entries per row.
    pub fn gradients(
        self,
        labels: &[f32],
        weights: Option<&[f32]>,
        margins: &[f64],
        groups: usize,
        group: usize,
    ) -> (Vec<f64>, Vec<f64>) {
        let n = labels.len();
        let mut gradients = Vec::with_capacity(n);
        let mut hessians = Vec::with_capacity(n);

        for row in 0..n {
            let w = weights.map_or(1.0, |w| w[row] as f64);
            let row_margins = &margins[row * groups..(row + 1) * groups];

            let (g, h) = match self {
                Objective::SquaredError => (row_margins[0] - labels[row] as f64, 1.0),
                Objective::Softmax | Objective::Softprob => {
                    let p = softmax(row_margins)[group];
                    let y = if labels[row] as usize == group { 1.0 } else { 0.0 };
                    (p - y, (2.0 * p * (1.0 - p)).max(MIN_HESSIAN))
                }
            };

            gradients.push(g * w);
            hessians.push(h * w);
        }

        (gradients, hessians)
    }

    /// Turn one row of margins into the objective's prediction output.
    pub fn transform(self, row_margins: &[f64], out: &mut Vec<f32>) {
        match self {
            Objective::SquaredError => out.push(row_margins[0] as f32),
            Objective::Softmax => out.push(argmax(row_margins) as f32),
            Objective::Softprob => out.extend(softmax(row_margins).into_iter().map(|p| p as f32)),
        }
    }
}

impl FromStr for Objective {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reg:squarederror" => Ok(Objective::SquaredError),
            "multi:softmax" => Ok(Objective::Softmax),
            "multi:softprob" => Ok(Objective::Softprob),
            other => Err(EngineError::UnknownObjective(other.to_string())),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn softmax(margins: &[f64]) -> Vec<f64> {
    let max = margins.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = margins.iter().map(|m| (m - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest margin; the first one wins ties.
fn argmax(margins: &[f64]) -> usize {
    let mut best = 0;
    for (i, &m) in margins.iter().enumerate() {
        if m > margins[best] {
            best = i;
        }
    }
    best
}
