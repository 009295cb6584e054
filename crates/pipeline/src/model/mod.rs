//! Model facade over a boosting engine
//!
//! [`Regressor`] and [`Classifier`] implement the shared [`Estimator`]
//! contract; [`Model`] selects between them by [`TaskKind`].

mod base;
mod classifier;
mod regressor;

use boostlab_engine::BoostingEngine;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{PipelineError, Result};
use crate::params::BoostParams;

pub use self::base::BoosterCore;
pub use self::classifier::{labels_path, Classifier};
pub use self::regressor::Regressor;

/// Objective injected for regression models.
pub const REGRESSION_OBJECTIVE: &str = "reg:squarederror";
/// Objective injected for classification models.
pub const CLASSIFICATION_OBJECTIVE: &str = "multi:softmax";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Regression,
    Classification,
}

impl FromStr for TaskKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "regression" => Ok(TaskKind::Regression),
            "classification" => Ok(TaskKind::Classification),
            _ => Err(PipelineError::InvalidParameter {
                key: "task".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Regression => f.write_str("regression"),
            TaskKind::Classification => f.write_str("classification"),
        }
    }
}

/// Progress interval a fit reports into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressRange {
    pub start: f32,
    pub end: f32,
}

impl Default for ProgressRange {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 1.0,
        }
    }
}

impl ProgressRange {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Progress after `completed` of `total` steps.
    pub fn at(&self, completed: usize, total: usize) -> f32 {
        if total == 0 {
            return self.end;
        }
        self.start + (self.end - self.start) * completed as f32 / total as f32
    }
}

/// Cooperative cancellation flag, cheap to clone across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress reporting and cancellation for one fit.
#[derive(Default)]
pub struct FitControl<'a> {
    pub range: ProgressRange,
    pub on_progress: Option<&'a mut dyn FnMut(f32)>,
    pub cancel: Option<&'a CancelToken>,
}

impl<'a> FitControl<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: ProgressRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_progress(mut self, on_progress: &'a mut dyn FnMut(f32)) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn with_cancel(mut self, cancel: &'a CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }

    fn report(&mut self, completed: usize, total: usize) {
        let value = self.range.at(completed, total);
        if let Some(on_progress) = self.on_progress.as_mut() {
            on_progress(value);
        }
    }
}

/// Outcome of a fit. A cancelled fit keeps the rounds it completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitReport {
    pub rounds_completed: usize,
    pub rounds_requested: usize,
    pub cancelled: bool,
}

/// Capabilities shared by every task kind.
pub trait Estimator {
    fn task(&self) -> TaskKind;

    /// Train a fresh model, replacing any existing one.
    ///
    /// `stabilizer` is only used by classification, to derive sample weights.
    fn fit(
        &mut self,
        features: &[Vec<f64>],
        targets: &[f64],
        stabilizer: Option<&[f32]>,
        control: FitControl<'_>,
    ) -> Result<FitReport>;

    /// One prediction per row. `None` marks a class code the model's label
    /// set cannot map back; regression predictions are always `Some`.
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Option<f64>>>;

    fn save_model(&self, path: &Path) -> Result<()>;

    fn load_model(&mut self, path: &Path) -> Result<()>;

    fn is_trained(&self) -> bool;
}

/// A regression or classification model.
pub enum Model<E: BoostingEngine> {
    Regression(Regressor<E>),
    Classification(Classifier<E>),
}

impl<E: BoostingEngine> Model<E> {
    pub fn new(task: TaskKind, engine: Arc<E>, params: BoostParams) -> Self {
        match task {
            TaskKind::Regression => Model::Regression(Regressor::new(engine, params)),
            TaskKind::Classification => Model::Classification(Classifier::new(engine, params)),
        }
    }

    pub fn as_classifier(&self) -> Option<&Classifier<E>> {
        match self {
            Model::Classification(m) => Some(m),
            Model::Regression(_) => None,
        }
    }
}

/// Forward a call to whichever estimator the variant holds.
macro_rules! delegate {
    ($self:ident, $m:ident => $call:expr) => {
        match $self {
            Model::Regression($m) => $call,
            Model::Classification($m) => $call,
        }
    };
}

impl<E: BoostingEngine> Estimator for Model<E> {
    fn task(&self) -> TaskKind {
        delegate!(self, m => m.task())
    }

    fn fit(
        &mut self,
        features: &[Vec<f64>],
        targets: &[f64],
        stabilizer: Option<&[f32]>,
        control: FitControl<'_>,
    ) -> Result<FitReport> {
        delegate!(self, m => m.fit(features, targets, stabilizer, control))
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Option<f64>>> {
        delegate!(self, m => m.predict(features))
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        delegate!(self, m => m.save_model(path))
    }

    fn load_model(&mut self, path: &Path) -> Result<()> {
        delegate!(self, m => m.load_model(path))
    }

    fn is_trained(&self) -> bool {
        delegate!(self, m => m.is_trained())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_kind_parse() {
        assert_eq!("Regression".parse::<TaskKind>().unwrap(), TaskKind::Regression);
        assert_eq!(
            "CLASSIFICATION".parse::<TaskKind>().unwrap(),
            TaskKind::Classification
        );
        assert!("ranking".parse::<TaskKind>().is_err());
        assert_eq!(TaskKind::Classification.to_string(), "classification");
    }

    #[test]
    fn test_progress_interpolation() {
        let range = ProgressRange::new(0.2, 0.6);
        assert!((range.at(1, 4) - 0.3).abs() < 1e-6);
        assert!((range.at(4, 4) - 0.6).abs() < 1e-6);
        assert_eq!(range.at(0, 0), 0.6);
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!other.is_cancelled());
    }
}
