//! Feature standardization

use crate::error::{LoanPredictorError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Z-score standardization: (x - mean) / std, fit per column.
///
/// Columns with zero variance fall back to a scale of 1.0 so constant
/// features pass through centered instead of producing NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Option<Array1<f64>>,
    stds: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            means: None,
            stds: None,
        }
    }

    /// Fit per-column mean and standard deviation
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(LoanPredictorError::DataError(
                "cannot fit scaler on empty matrix".to_string(),
            ));
        }

        let means = x.mean_axis(Axis(0)).ok_or_else(|| {
            LoanPredictorError::DataError("failed to compute column means".to_string())
        })?;
        let stds = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s == 0.0 { 1.0 } else { s });

        self.means = Some(means);
        self.stds = Some(stds);
        Ok(self)
    }

    /// Standardize using the fitted parameters
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (means, stds) = match (&self.means, &self.stds) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(LoanPredictorError::ModelNotFitted),
        };

        if x.ncols() != means.len() {
            return Err(LoanPredictorError::ShapeError {
                expected: format!("{} columns", means.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        Ok((x - &means.view().insert_axis(Axis(0))) / &stds.view().insert_axis(Axis(0)))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standardize() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0], [5.0, 50.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();

        for col in 0..2 {
            let column = scaled.column(col);
            let mean: f64 = column.iter().sum::<f64>() / column.len() as f64;
            assert!(mean.abs() < 1e-10);
        }
    }

    #[test]
    fn test_constant_column() {
        let x = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();

        // Constant column is centered but not blown up
        for v in scaled.column(1) {
            assert!((v - 0.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_unfitted_transform() {
        let scaler = StandardScaler::new();
        let x = array![[1.0], [2.0]];
        assert!(matches!(
            scaler.transform(&x).unwrap_err(),
            LoanPredictorError::ModelNotFitted
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let mut scaler = StandardScaler::new();
        scaler.fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let err = scaler.transform(&array![[1.0], [2.0]]).unwrap_err();
        assert!(matches!(err, LoanPredictorError::ShapeError { .. }));
    }
}
