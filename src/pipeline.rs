//! End-to-end segmentation run: ingestion through cluster assignment

use crate::clean::clean_transactions;
use crate::config::{ClusterConfig, PipelineConfig};
use crate::error::{Result, SegmentError};
use crate::features::extract_features;
use crate::ingest::{self, Table};
use crate::model::{fit_kmeans, select_k, KMeansModel, KSelection};
use crate::rfm::{compute_rfm, CustomerRfm};
use crate::scale::{scale_features, StandardScaler};
use ndarray::Array2;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// A customer's RFM row with its cluster label
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    pub rfm: CustomerRfm,
    pub cluster: usize,
}

/// Everything a run produces, for export and display
#[derive(Debug, Clone)]
pub struct SegmentationReport {
    pub transactions: usize,
    pub assignments: Vec<ClusterAssignment>,
    /// Silhouette diagnostics; `None` when too few customers to score
    pub selection: Option<KSelection>,
    pub n_clusters: usize,
    pub model: KMeansModel,
    pub scaler: StandardScaler,
    pub scaled: Array2<f64>,
}

/// Fit K-Means at `n_clusters` and attach labels to RFM rows by position
pub fn assign_clusters(
    rfm: &[CustomerRfm],
    scaled: &Array2<f64>,
    n_clusters: usize,
    config: &ClusterConfig,
) -> Result<(Vec<ClusterAssignment>, KMeansModel)> {
    if scaled.nrows() != rfm.len() {
        return Err(SegmentError::InsufficientData(format!(
            "feature matrix has {} rows for {} customers",
            scaled.nrows(),
            rfm.len()
        )));
    }

    let model = fit_kmeans(scaled, n_clusters, config)?;
    let assignments = rfm
        .iter()
        .zip(model.labels.iter())
        .map(|(row, &cluster)| ClusterAssignment {
            rfm: row.clone(),
            cluster,
        })
        .collect();

    Ok((assignments, model))
}

/// Run the whole pipeline on an already-parsed table
pub fn segment_table(table: &Table, config: &PipelineConfig) -> Result<SegmentationReport> {
    let transactions = clean_transactions(table)?;
    let rfm = compute_rfm(&transactions, config.snapshot)?;

    let features = extract_features(&rfm).to_matrix()?;
    let (scaled, scaler) = scale_features(&features)?;

    // An explicit k may still run when there are too few customers to score
    let selection = match select_k(&scaled, config.k_min, config.k_max, &config.cluster) {
        Ok(selection) => Some(selection),
        Err(SegmentError::InsufficientData(_)) if config.clusters.is_some() => None,
        Err(e) => return Err(e),
    };

    let n_clusters = config
        .clusters
        .or_else(|| selection.as_ref().map(|selection| selection.best_k))
        .ok_or_else(|| {
            SegmentError::InsufficientData("no cluster count could be selected".to_string())
        })?;

    let (assignments, model) = assign_clusters(&rfm, &scaled, n_clusters, &config.cluster)?;
    info!(
        customers = assignments.len(),
        n_clusters,
        inertia = model.inertia,
        "assigned clusters"
    );

    Ok(SegmentationReport {
        transactions: transactions.len(),
        assignments,
        selection,
        n_clusters,
        model,
        scaler,
        scaled,
    })
}

/// Run the pipeline on a Latin-1 CSV stream
pub fn segment_reader<R: Read>(reader: R, config: &PipelineConfig) -> Result<SegmentationReport> {
    let table = ingest::read_table(reader)?;
    segment_table(&table, config)
}

/// Run the pipeline on a CSV file
pub fn segment_file(path: &Path, config: &PipelineConfig) -> Result<SegmentationReport> {
    let table = ingest::load_table(path)?;
    segment_table(&table, config)
}
