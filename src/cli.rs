//! Command-line interface definitions and argument parsing

use crate::config::{ClusterConfig, PipelineConfig, DEFAULT_SEED};
use crate::error::{Result, SegmentError};
use crate::records::parse_timestamp;
use clap::Parser;

/// Smallest cluster count the CLI accepts for `--clusters`
pub const MIN_CLUSTERS: usize = 2;
/// Largest cluster count the CLI accepts for `--clusters`
pub const MAX_CLUSTERS: usize = 10;

/// Customer segmentation CLI: RFM metrics clustered with K-Means
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the transactions CSV file (Latin-1 compatible)
    #[arg(short, long, default_value = "data.csv")]
    pub input: String,

    /// Number of clusters; defaults to the silhouette-suggested count
    #[arg(short = 'k', long)]
    pub clusters: Option<usize>,

    /// Smallest cluster count to score
    #[arg(long, default_value = "2")]
    pub k_min: usize,

    /// Largest cluster count to score
    #[arg(long, default_value = "8")]
    pub k_max: usize,

    /// Seed for K-Means initialization
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value = "300")]
    pub max_iters: u64,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Number of K-Means initializations per fit
    #[arg(long, default_value = "10")]
    pub n_runs: usize,

    /// Reference date for recency (default: last invoice date + 1 day)
    #[arg(long)]
    pub snapshot: Option<String>,

    /// Output path for the clustered customers CSV
    #[arg(short, long, default_value = "rfm_clustered.csv")]
    pub output: String,

    /// Optional output path for the per-cluster summary CSV
    #[arg(long)]
    pub summary: Option<String>,

    /// Optional output path for the cluster scatter plot (SVG)
    #[arg(long)]
    pub plot: Option<String>,

    /// Prediction mode: provide R,F,M values as comma-separated string
    /// Example: --predict "30,10,500.0" for Recency=30, Frequency=10, Monetary=500.0
    #[arg(short, long)]
    pub predict: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse RFM values from the predict string
    /// Expected format: "recency,frequency,monetary"
    pub fn parse_rfm_values(&self) -> Result<Option<[f64; 3]>> {
        let Some(ref predict_str) = self.predict else {
            return Ok(None);
        };

        let parts: Vec<&str> = predict_str.split(',').collect();
        if parts.len() != 3 {
            return Err(SegmentError::InvalidParameter(
                "predict values must be in format 'recency,frequency,monetary'".to_string(),
            ));
        }

        let mut values = [0.0; 3];
        for ((slot, part), name) in values
            .iter_mut()
            .zip(&parts)
            .zip(["recency", "frequency", "monetary"])
        {
            *slot = part
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    SegmentError::InvalidParameter(format!("invalid {} value: {}", name, part))
                })?;
        }

        Ok(Some(values))
    }

    /// Build the pipeline configuration, rejecting out-of-range cluster counts
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let cluster = ClusterConfig::new()
            .with_seed(self.seed)
            .with_max_iters(self.max_iters)
            .with_tolerance(self.tolerance)
            .with_n_runs(self.n_runs);

        let mut config = PipelineConfig::new()
            .with_k_range(self.k_min, self.k_max)
            .with_cluster_config(cluster);

        if let Some(k) = self.clusters {
            if !(MIN_CLUSTERS..=MAX_CLUSTERS).contains(&k) {
                return Err(SegmentError::InvalidParameter(format!(
                    "number of clusters must be between {} and {}, got {}",
                    MIN_CLUSTERS, MAX_CLUSTERS, k
                )));
            }
            config = config.with_clusters(k);
        }

        if let Some(ref snapshot) = self.snapshot {
            let parsed = parse_timestamp(snapshot).ok_or_else(|| {
                SegmentError::InvalidParameter(format!("invalid snapshot date: {}", snapshot))
            })?;
            config = config.with_snapshot(parsed);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["rfm-segment", "--input", "test.csv"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_parse_rfm_values() {
        let mut args = args(&["--predict", "30,10,500.0"]);
        let result = args.parse_rfm_values().unwrap();
        assert_eq!(result, Some([30.0, 10.0, 500.0]));

        args.predict = None;
        assert_eq!(args.parse_rfm_values().unwrap(), None);

        args.predict = Some("invalid".to_string());
        assert!(args.parse_rfm_values().is_err());

        args.predict = Some("1,x,3".to_string());
        assert!(args.parse_rfm_values().is_err());
    }

    #[test]
    fn test_default_pipeline_config() {
        let config = args(&[]).pipeline_config().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_pipeline_config_overrides() {
        let config = args(&["-k", "4", "--seed", "7", "--snapshot", "2011-12-10"])
            .pipeline_config()
            .unwrap();
        assert_eq!(config.clusters, Some(4));
        assert_eq!(config.cluster.seed, 7);
        assert_eq!(config.snapshot, parse_timestamp("2011-12-10"));
    }

    #[test]
    fn test_cluster_bounds_enforced() {
        assert!(args(&["-k", "1"]).pipeline_config().is_err());
        assert!(args(&["-k", "11"]).pipeline_config().is_err());
        assert!(args(&["--snapshot", "yesterday"]).pipeline_config().is_err());
    }
}
