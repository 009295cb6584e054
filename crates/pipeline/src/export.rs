//! Prediction export
//!
//! Writes `y_true,y_pred` CSV, one line per holdout row. A class prediction
//! that could not be decoded is written as `NaN`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::Result;

pub const PREDICTIONS_HEADER: &str = "y_true,y_pred";

/// True target and model prediction for one holdout row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRow {
    pub y_true: f64,
    pub y_pred: Option<f64>,
}

pub fn write_predictions<W: Write>(mut writer: W, rows: &[PredictionRow]) -> Result<()> {
    writeln!(writer, "{PREDICTIONS_HEADER}")?;
    for row in rows {
        match row.y_pred {
            Some(pred) => writeln!(writer, "{},{}", row.y_true, pred)?,
            None => writeln!(writer, "{},NaN", row.y_true)?,
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn save_predictions<P: AsRef<Path>>(path: P, rows: &[PredictionRow]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_predictions(BufWriter::new(file), rows)?;
    tracing::info!("Wrote {} predictions to {}", rows.len(), path.as_ref().display());
    Ok(())
}
