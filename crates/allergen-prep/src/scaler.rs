//! Per-column standardization: zero mean and unit variance.

use serde::Serialize;
use tracing::debug;

use crate::PrepError;

/// Per-column mean and scale fitted on a training matrix.
///
/// Uses population standard deviation (divides by n, not n-1). A column whose
/// training values are all equal keeps that value as its mean and gets a
/// scale of 1.0, so it transforms to exact zeros instead of NaN or noise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingParameters {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl ScalingParameters {
    /// Fit column means and scales on `rows`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PrepError::EmptyMatrix`] | Zero rows, or rows of width zero |
    /// | [`PrepError::FeatureCountMismatch`] | Rows differ in width |
    /// | [`PrepError::NonFiniteValue`] | A cell is NaN or infinite |
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, PrepError> {
        let n_features = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(PrepError::EmptyMatrix),
        };
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != n_features {
                return Err(PrepError::FeatureCountMismatch {
                    expected: n_features,
                    got: row.len(),
                    row_index,
                });
            }
            if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
                return Err(PrepError::NonFiniteValue {
                    row_index,
                    feature_index,
                });
            }
        }

        let first = &rows[0];
        let constant: Vec<bool> = (0..n_features)
            .map(|j| rows.iter().all(|row| row[j] == first[j]))
            .collect();

        let n = rows.len() as f64;
        let mut means = vec![0.0; n_features];
        for row in rows {
            for (mean, &x) in means.iter_mut().zip(row) {
                *mean += x;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut variances = vec![0.0; n_features];
        for row in rows {
            for ((var, &x), &mean) in variances.iter_mut().zip(row).zip(&means) {
                *var += (x - mean).powi(2);
            }
        }

        // A summed mean of a constant column can miss the value by an ulp and
        // leave a spurious std near 1e-15; pin those columns exactly.
        let scales: Vec<f64> = variances
            .iter()
            .zip(&constant)
            .map(|(&v, &is_constant)| {
                let std = (v / n).sqrt();
                if is_constant || std == 0.0 { 1.0 } else { std }
            })
            .collect();
        for ((mean, &is_constant), &value) in means.iter_mut().zip(&constant).zip(first) {
            if is_constant {
                *mean = value;
            }
        }

        debug!(
            n_rows = rows.len(),
            n_features,
            n_constant = constant.iter().filter(|&&c| c).count(),
            "scaler fitted"
        );
        Ok(Self { means, scales })
    }

    /// Standardize one row: `(x - mean) / scale` per column.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::FeatureCountMismatch`] when `row` has the wrong width.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, PrepError> {
        self.check_width(row, 0)?;
        Ok(self.standardize(row))
    }

    /// Standardize every row of `rows`.
    ///
    /// # Errors
    ///
    /// Returns the first [`PrepError::FeatureCountMismatch`] encountered, tagged with its row index.
    pub fn transform_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, PrepError> {
        rows.iter()
            .enumerate()
            .map(|(row_index, row)| {
                self.check_width(row, row_index)?;
                Ok(self.standardize(row))
            })
            .collect()
    }

    /// Undo [`transform`](Self::transform): `z * scale + mean` per column.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::FeatureCountMismatch`] when `row` has the wrong width.
    pub fn inverse_transform(&self, row: &[f64]) -> Result<Vec<f64>, PrepError> {
        self.check_width(row, 0)?;
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(&z, (&mean, &scale))| z * scale + mean)
            .collect())
    }

    /// Caller has checked the width.
    fn standardize(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(&x, (&mean, &scale))| (x - mean) / scale)
            .collect()
    }

    fn check_width(&self, row: &[f64], row_index: usize) -> Result<(), PrepError> {
        if row.len() == self.means.len() {
            Ok(())
        } else {
            Err(PrepError::FeatureCountMismatch {
                expected: self.means.len(),
                got: row.len(),
                row_index,
            })
        }
    }

    /// Column means, in feature order.
    #[must_use]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Column scales, in feature order. Never zero.
    #[must_use]
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Number of columns the parameters were fit on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.means.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-10, "{a} != {b}");
    }

    #[test]
    fn known_mean_and_population_std() {
        let rows = vec![vec![2.0, 10.0], vec![4.0, 10.0], vec![6.0, 10.0]];
        let params = ScalingParameters::fit(&rows).unwrap();
        assert_close(params.means()[0], 4.0);
        assert_close(params.scales()[0], (8.0_f64 / 3.0).sqrt());
        assert_close(params.means()[1], 10.0);
        assert_close(params.scales()[1], 1.0);
    }

    #[test]
    fn transformed_training_columns_are_standard() {
        let rows: Vec<Vec<f64>> = (0..50)
            .map(|i| vec![f64::from(i) * 1.7 - 3.0, f64::from(i % 7)])
            .collect();
        let params = ScalingParameters::fit(&rows).unwrap();
        let scaled = params.transform_batch(&rows).unwrap();
        for col in 0..2 {
            let mean = scaled.iter().map(|r| r[col]).sum::<f64>() / 50.0;
            let var = scaled.iter().map(|r| (r[col] - mean).powi(2)).sum::<f64>() / 50.0;
            assert!(mean.abs() < 1e-9);
            assert!((var.sqrt() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let rows = vec![vec![5.0], vec![5.0], vec![5.0]];
        let params = ScalingParameters::fit(&rows).unwrap();
        let scaled = params.transform_batch(&rows).unwrap();
        assert!(scaled.iter().all(|r| r[0] == 0.0));
        assert_eq!(params.transform(&[7.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn inexact_constant_columns_map_to_exact_zero() {
        for (value, n) in [(0.1, 3), (54.2, 3), (120.7, 7)] {
            let rows = vec![vec![value]; n];
            let params = ScalingParameters::fit(&rows).unwrap();
            assert_eq!(params.scales(), &[1.0]);
            assert_eq!(params.means(), &[value]);
            assert_eq!(params.transform(&[value]).unwrap(), vec![0.0]);
        }

        let rows = vec![vec![54.2]; 3];
        let params = ScalingParameters::fit(&rows).unwrap();
        let z = params.transform(&[54.3]).unwrap()[0];
        assert!((z - 0.1).abs() < 1e-9, "{z}");
    }

    #[test]
    fn inverse_recovers_input() {
        let rows = vec![vec![18.0, 0.4, 3.0], vec![62.0, 9.9, 7.0], vec![35.0, 2.5, 0.0]];
        let params = ScalingParameters::fit(&rows).unwrap();
        for row in &rows {
            let z = params.transform(row).unwrap();
            let back = params.inverse_transform(&z).unwrap();
            for (a, b) in row.iter().zip(&back) {
                assert!((a - b).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn width_mismatch_rejected() {
        let params = ScalingParameters::fit(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(matches!(
            params.transform(&[1.0]),
            Err(PrepError::FeatureCountMismatch { expected: 2, got: 1, .. })
        ));
        let err = params
            .transform_batch(&[vec![1.0, 2.0], vec![1.0, 2.0, 3.0]])
            .unwrap_err();
        assert!(matches!(err, PrepError::FeatureCountMismatch { row_index: 1, .. }));
    }

    #[test]
    fn invalid_fit_inputs() {
        assert!(matches!(ScalingParameters::fit(&[]), Err(PrepError::EmptyMatrix)));
        assert!(matches!(
            ScalingParameters::fit(&[vec![1.0], vec![1.0, 2.0]]),
            Err(PrepError::FeatureCountMismatch { row_index: 1, .. })
        ));
        assert!(matches!(
            ScalingParameters::fit(&[vec![1.0, f64::NAN]]),
            Err(PrepError::NonFiniteValue { row_index: 0, feature_index: 1 })
        ));
    }
}
