//! boostlab pipeline - CSV to gradient-boosted model and back
//!
//! Loads numeric CSV data, draws a 66/34 train/holdout split, trains a
//! regression or multi-class classification model through any
//! [`boostlab_engine::BoostingEngine`], and exports holdout predictions.
//! Classification accepts arbitrary numeric labels and can weight samples
//! from a stabilizer column.

pub mod config;
pub mod dataset;
pub mod errors;
pub mod export;
pub mod labels;
pub mod model;
pub mod params;
pub mod session;
pub mod split;
pub mod weights;

use boostlab_engine::BoostingEngine;
use std::path::Path;
use std::sync::Arc;

pub use config::TrainerConfig;
pub use dataset::{ColumnStats, Dataset};
pub use errors::{PipelineError, Result};
pub use export::{save_predictions, write_predictions, PredictionRow};
pub use labels::LabelCodec;
pub use model::{
    CancelToken, Classifier, Estimator, FitControl, FitReport, Model, ProgressRange, Regressor,
    TaskKind,
};
pub use params::BoostParams;
pub use session::Session;
pub use split::{split, split_rng, train_count, Partition, Selection, Split, TRAIN_RATIO};
pub use weights::{derive_weights, sample_weights};

/// Load `path`, split on the named columns and train a `task` model.
///
/// Returns the session holding the dataset, split and trained model.
pub fn train_from_csv<E: BoostingEngine>(
    engine: Arc<E>,
    config: TrainerConfig,
    path: &Path,
    features: &[&str],
    target: &str,
    stabilizer: Option<&str>,
    task: TaskKind,
) -> Result<Session<E>> {
    let mut session = Session::new(engine, config);
    let dataset = session.load_dataset(path)?;
    let selection = Selection::by_name(dataset, features, target, stabilizer)?;

    let mut rng = split_rng(session.config().split.seed);
    session.compute_split_with(selection, &mut rng)?;
    session.fit(task, FitControl::new())?;
    Ok(session)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
