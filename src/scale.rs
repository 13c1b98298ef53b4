//! Standard scaling of feature columns

use crate::error::{Result, SegmentError};
use crate::features::FEATURE_NAMES;
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Per-column mean and population standard deviation fitted on one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

fn column_name(index: usize) -> String {
    FEATURE_NAMES
        .get(index)
        .map_or_else(|| format!("column {}", index), |name| name.to_string())
}

impl StandardScaler {
    /// Fit column statistics; constant columns are rejected instead of yielding NaN
    pub fn fit(features: &Array2<f64>) -> Result<Self> {
        let mean = features.mean_axis(Axis(0)).ok_or_else(|| {
            SegmentError::InsufficientData("cannot fit a scaler on zero rows".to_string())
        })?;
        let std = features.std_axis(Axis(0), 0.0);

        for (index, (&sd, &mu)) in std.iter().zip(mean.iter()).enumerate() {
            // Relative floor: a constant column can leave rounding noise in the std
            if !(sd > 1e-12 * mu.abs().max(1.0)) {
                return Err(SegmentError::DegenerateColumn {
                    column: column_name(index),
                });
            }
        }

        Ok(Self { mean, std })
    }

    /// Standardize rows with the fitted statistics
    pub fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.mean.len() {
            return Err(SegmentError::InvalidParameter(format!(
                "expected {} feature columns, got {}",
                self.mean.len(),
                features.ncols()
            )));
        }
        Ok((features - &self.mean) / &self.std)
    }

    /// Standardize a single observation
    pub fn transform_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>> {
        if row.len() != self.mean.len() {
            return Err(SegmentError::InvalidParameter(format!(
                "expected {} feature values, got {}",
                self.mean.len(),
                row.len()
            )));
        }
        Ok((&row - &self.mean) / &self.std)
    }
}

/// Fit a scaler and return the scaled matrix alongside it
pub fn scale_features(features: &Array2<f64>) -> Result<(Array2<f64>, StandardScaler)> {
    let scaler = StandardScaler::fit(features)?;
    let scaled = scaler.transform(features)?;
    Ok((scaled, scaler))
}
