//! Feature extraction: per-customer numeric (R, F, M) vectors

use crate::error::{Result, SegmentError};
use crate::rfm::CustomerRfm;
use ndarray::Array2;

/// Feature column names in matrix order
pub const FEATURE_NAMES: [&str; 3] = ["Recency", "Frequency", "Monetary"];

/// (Recency, Frequency, Monetary); `None` marks a value that failed coercion
pub type FeatureVector = [Option<f64>; 3];

/// Feature vectors indexed by customer id, in RFM table order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub customer_ids: Vec<String>,
    pub rows: Vec<FeatureVector>,
}

fn finite(value: f64) -> Option<f64> {
    Some(value).filter(|v| v.is_finite())
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dense `(n_customers, 3)` matrix; fails on the first missing value
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        let mut values = Vec::with_capacity(self.rows.len() * FEATURE_NAMES.len());
        for (customer_id, row) in self.customer_ids.iter().zip(&self.rows) {
            for (column, value) in FEATURE_NAMES.iter().zip(row) {
                let value = value.ok_or_else(|| SegmentError::Feature {
                    customer_id: customer_id.clone(),
                    column: column.to_string(),
                })?;
                values.push(value);
            }
        }

        Array2::from_shape_vec((self.rows.len(), FEATURE_NAMES.len()), values)
            .map_err(|e| SegmentError::InvalidParameter(e.to_string()))
    }
}

/// Coerce the RFM table to feature vectors; non-finite values become missing
pub fn extract_features(rfm: &[CustomerRfm]) -> FeatureSet {
    let customer_ids = rfm.iter().map(|row| row.customer_id.clone()).collect();
    let rows = rfm
        .iter()
        .map(|row| {
            [
                finite(row.recency as f64),
                finite(row.frequency as f64),
                finite(row.monetary),
            ]
        })
        .collect();

    FeatureSet { customer_ids, rows }
}
