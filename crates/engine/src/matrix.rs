//! Dense feature matrix with row-aligned labels and weights

use crate::api::InfoField;
use crate::errors::EngineError;

/// Row-major dense matrix. Missing cells are stored as NaN.
#[derive(Clone, Debug)]
pub struct DenseMatrix {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
    labels: Option<Vec<f32>>,
    weights: Option<Vec<f32>>,
}

impl DenseMatrix {
    pub fn from_dense(data: &[f32], rows: usize, cols: usize, missing: f32) -> Result<Self, EngineError> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            EngineError::DimensionMismatch(format!("{rows} x {cols} overflows"))
        })?;
        if data.len() != expected {
            return Err(EngineError::DimensionMismatch(format!(
                "expected {expected} values for a {rows} x {cols} matrix, got {}",
                data.len()
            )));
        }

        let data = data
            .iter()
            .map(|&v| if v == missing { f32::NAN } else { v })
            .collect();

        Ok(Self {
            data,
            rows,
            cols,
            labels: None,
            weights: None,
        })
    }

    pub fn set_info(&mut self, field: InfoField, values: &[f32]) -> Result<(), EngineError> {
        if values.len() != self.rows {
            return Err(EngineError::DimensionMismatch(format!(
                "{field} has {} entries but the matrix has {} rows",
                values.len(),
                self.rows
            )));
        }

        match field {
            InfoField::Label => self.labels = Some(values.to_vec()),
            InfoField::Weight => self.weights = Some(values.to_vec()),
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, idx: usize) -> &[f32] {
        &self.data[idx * self.cols..(idx + 1) * self.cols]
    }

    pub fn value(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn labels(&self) -> Option<&[f32]> {
        self.labels.as_deref()
    }

    pub fn weights(&self) -> Option<&[f32]> {
        self.weights.as_deref()
    }

    /// Weight of a row, defaulting to 1 when no weights are attached.
    pub fn weight(&self, row: usize) -> f32 {
        self.weights.as_ref().map_or(1.0, |w| w[row])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_marker_becomes_nan() {
        let m = DenseMatrix::from_dense(&[1.0, -1.0, 3.0, 4.0], 2, 2, -1.0).unwrap();
        assert_eq!(m.row(0)[0], 1.0);
        assert!(m.value(0, 1).is_nan());
        assert_eq!(m.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = DenseMatrix::from_dense(&[1.0, 2.0, 3.0], 2, 2, f32::NAN).unwrap_err();
        assert!(matches!(err, EngineError::DimensionMismatch(_)));
    }

    #[test]
    fn test_info_length_checked() {
        let mut m = DenseMatrix::from_dense(&[1.0, 2.0], 2, 1, f32::NAN).unwrap();
        assert!(m.set_info(InfoField::Label, &[1.0]).is_err());
        m.set_info(InfoField::Weight, &[0.5, 1.5]).unwrap();
        assert_eq!(m.weight(1), 1.5);
        assert!(m.labels().is_none());
    }
}
