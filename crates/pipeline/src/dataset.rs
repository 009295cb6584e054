//! CSV dataset loading
//!
//! The first line is a comma-separated header. Every following non-blank
//! line is a row of numeric fields; a field that does not parse as a number
//! reads as `0.0`. Rows must have exactly as many fields as the header.

use std::io::Read;
use std::path::Path;

use crate::errors::{PipelineError, Result};

/// Column names plus row-major numeric values.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// Summary of one column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Dataset {
    /// Load dataset from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = content.lines().enumerate();

        let header = match lines.next() {
            Some((_, line)) if !line.trim().is_empty() => line,
            _ => return Err(PipelineError::MalformedInput("empty file".to_string())),
        };
        let columns: Vec<String> = header.split(',').map(|s| s.trim().to_string()).collect();

        let mut rows = Vec::new();
        for (line_idx, line) in lines {
            if line.trim().is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split(',').collect();
            if parts.len() != columns.len() {
                return Err(PipelineError::MalformedInput(format!(
                    "line {}: expected {} fields, got {}",
                    line_idx + 1,
                    columns.len(),
                    parts.len()
                )));
            }

            rows.push(parts.iter().map(|p| parse_field(p)).collect());
        }

        tracing::debug!("parsed {} rows x {} columns", rows.len(), columns.len());
        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column with this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_stats(&self) -> Vec<ColumnStats> {
        self.columns
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let mut min = f64::INFINITY;
                let mut max = f64::NEG_INFINITY;
                let mut sum = 0.0;
                for row in &self.rows {
                    min = min.min(row[col]);
                    max = max.max(row[col]);
                    sum += row[col];
                }
                let mean = if self.rows.is_empty() {
                    f64::NAN
                } else {
                    sum / self.rows.len() as f64
                };
                ColumnStats {
                    name: name.clone(),
                    min,
                    max,
                    mean,
                }
            })
            .collect()
    }
}

/// Parse one field, reading anything unparseable as `0.0`.
fn parse_field(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}
