//! rfm-segment: customer segmentation from retail transaction logs
//!
//! Transactions are cleaned and aggregated into per-customer RFM (Recency,
//! Frequency, Monetary) metrics. The metrics are standardized, a cluster count
//! is chosen by silhouette score, and every customer gets a K-Means label.

pub mod clean;
pub mod cli;
pub mod columns;
pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod records;
pub mod rfm;
pub mod scale;
pub mod summary;
pub mod viz;

// Re-export public items for easier access
pub use clean::clean_transactions;
pub use cli::Args;
pub use config::{ClusterConfig, PipelineConfig};
pub use error::{Result, SegmentError};
pub use features::{extract_features, FeatureSet};
pub use ingest::{load_table, read_table, Table};
pub use model::{fit_kmeans, predict_cluster, select_k, silhouette_score, KMeansModel, KSelection};
pub use pipeline::{
    assign_clusters, segment_file, segment_reader, segment_table, ClusterAssignment,
    SegmentationReport,
};
pub use records::{CleanedTransaction, CustomerId, TransactionRecord};
pub use rfm::{compute_rfm, CustomerRfm};
pub use scale::{scale_features, StandardScaler};
pub use summary::{summarize, ClusterSummary};
