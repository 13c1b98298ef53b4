//! Configuration for clustering runs

use chrono::NaiveDateTime;

/// Seed used when none is supplied, so repeated runs label customers identically
pub const DEFAULT_SEED: u64 = 42;

/// K-Means fitting parameters shared by cluster-count selection and final clustering
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    /// Seed for centroid initialization
    pub seed: u64,
    /// Maximum Lloyd iterations per run
    pub max_iters: u64,
    /// Convergence tolerance
    pub tolerance: f64,
    /// Number of independent initializations; the lowest-inertia run wins
    pub n_runs: usize,
}

impl ClusterConfig {
    pub fn new() -> Self {
        Self {
            seed: DEFAULT_SEED,
            max_iters: 300,
            tolerance: 1e-4,
            n_runs: 10,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_n_runs(mut self, n_runs: usize) -> Self {
        self.n_runs = n_runs;
        self
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// End-to-end pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Smallest candidate cluster count (must be at least 2)
    pub k_min: usize,
    /// Largest candidate cluster count, capped at `n_customers - 1`
    pub k_max: usize,
    /// Fixed cluster count; `None` uses the silhouette-selected one
    pub clusters: Option<usize>,
    /// Reference instant for recency; `None` means last invoice date + 1 day
    pub snapshot: Option<NaiveDateTime>,
    /// K-Means parameters
    pub cluster: ClusterConfig,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self {
            k_min: 2,
            k_max: 8,
            clusters: None,
            snapshot: None,
            cluster: ClusterConfig::default(),
        }
    }

    /// Set the candidate range for cluster-count selection
    pub fn with_k_range(mut self, k_min: usize, k_max: usize) -> Self {
        self.k_min = k_min;
        self.k_max = k_max;
        self
    }

    /// Override the selected cluster count
    pub fn with_clusters(mut self, clusters: usize) -> Self {
        self.clusters = Some(clusters);
        self
    }

    pub fn with_snapshot(mut self, snapshot: NaiveDateTime) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_cluster_config(mut self, cluster: ClusterConfig) -> Self {
        self.cluster = cluster;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
