//! Error types for the segmentation pipeline

use thiserror::Error;

/// Pipeline error type
#[derive(Error, Debug)]
pub enum SegmentError {
    /// Input stream is not well-formed delimited data
    #[error("Parse error: {0}")]
    Parse(String),

    /// Required canonical columns are absent after normalization
    #[error("Dataset is missing required transaction columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A feature value is missing or non-numeric
    #[error("Feature error: customer {customer_id} has no numeric {column}")]
    Feature { customer_id: String, column: String },

    /// A feature column has zero variance and cannot be standardized
    #[error("Column {column} is constant (standard deviation is zero) and cannot be scaled")]
    DegenerateColumn { column: String },

    /// Too few rows or customers for the requested operation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A caller-supplied parameter is out of range or malformed
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// K-Means fitting failed inside linfa
    #[error("Clustering error: {0}")]
    Clustering(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, SegmentError>;
