//! Column-wise standardization
//!
//! Fitting and transforming are separate steps. The pipeline fits on the same
//! records it scores, but a scaler fitted on one matrix can be applied to any
//! other matrix with the same columns.

use ndarray::{Array1, Array2, Axis};

use crate::error::{Result, RiskError};

/// Variance below this is treated as a constant column
const MIN_STD: f64 = 1e-10;

/// Zero-mean, unit-variance scaler (population standard deviation)
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    /// Mean of each feature
    means: Array1<f64>,
    /// Standard deviation of each feature
    stds: Array1<f64>,
}

impl StandardScaler {
    /// Fit scaler statistics on a feature matrix
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let means = x.mean_axis(Axis(0)).ok_or_else(|| {
            RiskError::encoding("<matrix>", None, "cannot standardize a matrix without rows")
        })?;
        let stds = x.std_axis(Axis(0), 0.0);

        let constant = stds.iter().filter(|&&s| s <= MIN_STD).count();
        if constant > 0 {
            log::warn!("{} constant feature column(s) will standardize to zero", constant);
        }

        Ok(Self { means, stds })
    }

    /// Standardize a matrix with the fitted statistics
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.means.len() {
            return Err(RiskError::encoding(
                "<matrix>",
                None,
                format!(
                    "scaler fitted on {} columns, got {}",
                    self.means.len(),
                    x.ncols()
                ),
            ));
        }

        let mut result = Array2::zeros(x.raw_dim());
        for (j, mut col) in result.columns_mut().into_iter().enumerate() {
            let std = self.stds[j];
            let mean = self.means[j];
            for (i, val) in col.iter_mut().enumerate() {
                if std > MIN_STD {
                    *val = (x[[i, j]] - mean) / std;
                } else {
                    *val = 0.0;
                }
            }
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(x: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(x)?;
        let scaled = scaler.transform(x)?;
        Ok((scaler, scaled))
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn stds(&self) -> &Array1<f64> {
        &self.stds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_standardized_columns() {
        let x = Array2::from_shape_vec((4, 2), vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0])
            .unwrap();
        let (_, scaled) = StandardScaler::fit_transform(&x).unwrap();

        for col in scaled.columns() {
            assert_abs_diff_eq!(col.mean().unwrap(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(col.std(0.0), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_constant_column_becomes_zero() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 5.0, 2.0, 5.0, 3.0, 5.0]).unwrap();
        let (_, scaled) = StandardScaler::fit_transform(&x).unwrap();

        assert!(scaled.column(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_transform_other_matrix_with_fitted_statistics() {
        let train = Array2::from_shape_vec((2, 1), vec![0.0, 2.0]).unwrap();
        let scaler = StandardScaler::fit(&train).unwrap();

        let current = Array2::from_shape_vec((1, 1), vec![3.0]).unwrap();
        let scaled = scaler.transform(&current).unwrap();

        // mean 1, std 1
        assert_abs_diff_eq!(scaled[[0, 0]], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_width_mismatch() {
        let scaler = StandardScaler::fit(&Array2::zeros((2, 3))).unwrap();
        assert!(scaler.transform(&Array2::zeros((2, 2))).is_err());
    }

    #[test]
    fn test_empty_matrix() {
        assert!(StandardScaler::fit(&Array2::zeros((0, 3))).is_err());
    }
}
