//! boostlab command line interface
//!
//! Trains gradient-boosted tree models on CSV data, exports holdout
//! predictions and inspects datasets.

use anyhow::{anyhow, Context, Result};
use boostlab_engine::NativeEngine;
use boostlab_pipeline::{
    split_rng, Dataset, FitControl, PredictionRow, Selection, Session, TaskKind, TrainerConfig,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "boostlab")]
#[command(author = "boostlab Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gradient-boosted tree training on CSV data", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a model and evaluate it on the holdout split
    Train(TrainCommand),
    /// Evaluate a saved model on the holdout split
    Predict(PredictCommand),
    /// Show column statistics for a CSV file
    Inspect {
        /// Input CSV path
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Dataset, column selection and split shared by `train` and `predict`.
#[derive(Args, Debug)]
struct DataArgs {
    /// Input CSV path (header row, numeric fields)
    #[arg(short, long)]
    input: PathBuf,

    /// Feature column names, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    features: Vec<String>,

    /// Target column name
    #[arg(short, long)]
    target: String,

    /// Stabilizer column used to weight classification samples
    #[arg(long)]
    stabilizer: Option<String>,

    /// regression or classification
    #[arg(long, default_value = "regression")]
    task: TaskKind,

    /// Seed for the train/test split
    #[arg(long)]
    seed: Option<u64>,

    /// Write holdout predictions to this CSV
    #[arg(short, long)]
    predictions: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TrainCommand {
    #[command(flatten)]
    data: DataArgs,

    /// Number of boosting rounds
    #[arg(long)]
    rounds: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Learning rate
    #[arg(long)]
    eta: Option<f64>,

    /// L2 regularization on leaf weights
    #[arg(long)]
    lambda: Option<f64>,

    /// Extra engine parameter as key=value (repeatable)
    #[arg(long = "param", value_parser = parse_key_val)]
    params: Vec<(String, String)>,

    /// Save the trained model here
    #[arg(short, long)]
    model_out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PredictCommand {
    #[command(flatten)]
    data: DataArgs,

    /// Saved model path
    #[arg(short, long)]
    model: PathBuf,
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn load_config(path: Option<&Path>) -> Result<TrainerConfig> {
    let mut config = match path {
        Some(path) => TrainerConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TrainerConfig::default(),
    };
    config
        .apply_env()
        .context("Invalid environment override")?;
    Ok(config)
}

fn log_level(verbose: bool, configured: &str) -> Result<Level> {
    if verbose {
        return Ok(Level::DEBUG);
    }
    configured
        .parse()
        .map_err(|_| anyhow!("unknown log level `{configured}`"))
}

fn init_logging(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

impl TrainCommand {
    fn apply_overrides(&self, config: &mut TrainerConfig) -> Result<()> {
        let params = &mut config.params;
        if let Some(rounds) = self.rounds {
            params.num_boost_round = rounds;
        }
        if let Some(max_depth) = self.max_depth {
            params.max_depth = max_depth;
        }
        if let Some(eta) = self.eta {
            params.eta = eta;
        }
        if let Some(lambda) = self.lambda {
            params.lambda = lambda;
        }
        for (key, value) in &self.params {
            params
                .set(key, value)
                .with_context(|| format!("Invalid parameter {key}={value}"))?;
        }
        Ok(())
    }
}

/// Load the dataset and draw the train/test split for `data`.
fn prepare_session(data: &DataArgs, mut config: TrainerConfig) -> Result<Session<NativeEngine>> {
    if data.seed.is_some() {
        config.split.seed = data.seed;
    }
    config.validate().context("Invalid configuration")?;

    let mut session = Session::new(Arc::new(NativeEngine::new()), config);
    let dataset = session
        .load_dataset(&data.input)
        .with_context(|| format!("Failed to load dataset {}", data.input.display()))?;

    let features: Vec<&str> = data.features.iter().map(String::as_str).collect();
    let selection = Selection::by_name(
        dataset,
        &features,
        &data.target,
        data.stabilizer.as_deref(),
    )?;

    match session.config().split.seed {
        Some(seed) => info!("Splitting with seed: {}", seed),
        None => info!("Splitting with a random seed"),
    }
    let mut rng = split_rng(session.config().split.seed);
    let split = session
        .compute_split_with(selection, &mut rng)
        .context("Failed to split dataset")?;
    info!("  Train rows: {}", split.train.len());
    info!("  Test rows: {}", split.test.len());

    Ok(session)
}

/// Holdout quality: RMSE for regression, accuracy for classification.
fn summarize(task: TaskKind, rows: &[PredictionRow]) -> String {
    match task {
        TaskKind::Regression => {
            let known: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.y_pred.map(|p| p - r.y_true))
                .collect();
            if known.is_empty() {
                return "no predictions".to_string();
            }
            let mse = known.iter().map(|e| e * e).sum::<f64>() / known.len() as f64;
            format!("RMSE {:.4} over {} rows", mse.sqrt(), known.len())
        }
        TaskKind::Classification => {
            let correct = rows.iter().filter(|r| r.y_pred == Some(r.y_true)).count();
            let unknown = rows.iter().filter(|r| r.y_pred.is_none()).count();
            let accuracy = if rows.is_empty() {
                0.0
            } else {
                correct as f64 / rows.len() as f64
            };
            format!(
                "accuracy {:.2}% ({}/{}), {} unknown",
                accuracy * 100.0,
                correct,
                rows.len(),
                unknown
            )
        }
    }
}

fn evaluate(session: &Session<NativeEngine>, data: &DataArgs) -> Result<()> {
    let rows = session.predict().context("Failed to predict holdout rows")?;
    info!("Holdout {}", summarize(data.task, &rows));

    if let Some(path) = &data.predictions {
        boostlab_pipeline::save_predictions(path, &rows)
            .with_context(|| format!("Failed to write predictions {}", path.display()))?;
        info!("  Predictions: {}", path.display());
    }
    Ok(())
}

fn run_train(cmd: &TrainCommand, mut config: TrainerConfig) -> Result<()> {
    cmd.apply_overrides(&mut config)?;
    let mut session = prepare_session(&cmd.data, config)?;

    let params = &session.config().params;
    info!("Training configuration:");
    info!("  Task: {}", cmd.data.task);
    info!("  Rounds: {}", params.num_boost_round);
    info!("  Max depth: {}", params.max_depth);
    info!("  Learning rate: {}", params.eta);
    info!("  Lambda: {}", params.lambda);
    for (key, value) in &params.extra {
        info!("  {}: {}", key, value);
    }

    let mut on_progress = |p: f32| debug!("progress {:.0}%", p * 100.0);
    let report = session
        .fit(cmd.data.task, FitControl::new().with_progress(&mut on_progress))
        .context("Training failed")?;
    if report.cancelled {
        warn!(
            "Training stopped after {} of {} rounds",
            report.rounds_completed, report.rounds_requested
        );
    } else {
        info!("Training complete: {} rounds", report.rounds_completed);
    }

    evaluate(&session, &cmd.data)?;

    if let Some(path) = &cmd.model_out {
        session
            .save_model(path)
            .with_context(|| format!("Failed to save model {}", path.display()))?;
        info!("  Model: {}", path.display());
    }
    Ok(())
}

fn run_predict(cmd: &PredictCommand, config: TrainerConfig) -> Result<()> {
    let mut session = prepare_session(&cmd.data, config)?;
    session
        .load_model(cmd.data.task, &cmd.model)
        .with_context(|| format!("Failed to load model {}", cmd.model.display()))?;
    evaluate(&session, &cmd.data)
}

fn run_inspect(input: &Path) -> Result<()> {
    let dataset = Dataset::from_csv(input)
        .with_context(|| format!("Failed to load dataset {}", input.display()))?;

    info!(
        "{}: {} rows, {} columns",
        input.display(),
        dataset.row_count(),
        dataset.column_count()
    );
    for stats in dataset.column_stats() {
        info!(
            "  {}: min={}, max={}, mean={:.4}",
            stats.name, stats.min, stats.max, stats.mean
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(log_level(cli.verbose, &config.logging.level)?)?;

    info!("boostlab v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Train(cmd) => run_train(cmd, config),
        Commands::Predict(cmd) => run_predict(cmd, config),
        Commands::Inspect { input } => run_inspect(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("min_child_weight = 0").unwrap(),
            ("min_child_weight".to_string(), "0".to_string())
        );
        assert!(parse_key_val("no_equals").is_err());
        assert!(parse_key_val("=1").is_err());
    }

    #[test]
    fn test_train_args_parse() {
        let cli = Cli::try_parse_from([
            "boostlab",
            "train",
            "-i",
            "data.csv",
            "-f",
            "a,b",
            "-t",
            "y",
            "--task",
            "Classification",
            "--param",
            "min_child_weight=0",
            "--rounds",
            "5",
        ])
        .unwrap();

        let Commands::Train(cmd) = cli.command else {
            panic!("expected train command");
        };
        assert_eq!(cmd.data.features, vec!["a", "b"]);
        assert_eq!(cmd.data.task, TaskKind::Classification);

        let mut config = TrainerConfig::default();
        cmd.apply_overrides(&mut config).unwrap();
        assert_eq!(config.params.num_boost_round, 5);
        assert_eq!(config.params.extra["min_child_weight"], "0");
    }

    #[test]
    fn test_objective_override_rejected() {
        let cli = Cli::try_parse_from([
            "boostlab", "train", "-i", "d.csv", "-f", "a", "-t", "y", "--param",
            "objective=binary:logistic",
        ])
        .unwrap();
        let Commands::Train(cmd) = cli.command else {
            panic!("expected train command");
        };
        assert!(cmd.apply_overrides(&mut TrainerConfig::default()).is_err());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(true, "error").unwrap(), Level::DEBUG);
        assert_eq!(log_level(false, "warn").unwrap(), Level::WARN);
        assert!(log_level(false, "loud").is_err());
    }

    #[test]
    fn test_summarize() {
        let rows = [
            PredictionRow {
                y_true: 5.0,
                y_pred: Some(5.0),
            },
            PredictionRow {
                y_true: 7.0,
                y_pred: None,
            },
        ];
        assert_eq!(
            summarize(TaskKind::Classification, &rows),
            "accuracy 50.00% (1/2), 1 unknown"
        );
        assert_eq!(
            summarize(TaskKind::Regression, &rows),
            "RMSE 0.0000 over 1 rows"
        );
    }
}
