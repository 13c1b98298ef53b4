//! K-Means clustering, silhouette scoring and cluster-count selection

use crate::config::ClusterConfig;
use crate::error::{Result, SegmentError};
use crate::scale::StandardScaler;
use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Score recorded for a candidate whose labels collapse to one cluster
pub const COLLAPSED_SCORE: f64 = -1.0;

/// Fitted K-Means result
#[derive(Debug, Clone)]
pub struct KMeansModel {
    /// Number of clusters
    pub n_clusters: usize,
    /// Cluster assignments for training data
    pub labels: Array1<usize>,
    /// Cluster centroids in scaled space
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares (inertia)
    pub inertia: f64,
}

impl KMeansModel {
    /// Predict cluster for a new (scaled) data point
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<usize> {
        if features.len() != self.centroids.ncols() {
            return Err(SegmentError::InvalidParameter(format!(
                "feature vector must have exactly {} dimensions",
                self.centroids.ncols()
            )));
        }

        // Find nearest centroid
        let mut min_distance = f64::INFINITY;
        let mut closest_cluster = 0;

        for (cluster_idx, centroid) in self.centroids.outer_iter().enumerate() {
            let distance = euclidean_distance(&features, &centroid);
            if distance < min_distance {
                min_distance = distance;
                closest_cluster = cluster_idx;
            }
        }

        Ok(closest_cluster)
    }

    /// Get cluster sizes
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in self.labels.iter() {
            if label < self.n_clusters {
                sizes[label] += 1;
            }
        }
        sizes
    }

    /// Number of distinct labels actually assigned
    pub fn distinct_labels(&self) -> usize {
        self.labels.iter().collect::<HashSet<_>>().len()
    }
}

/// Outcome of cluster-count selection
#[derive(Debug, Clone, PartialEq)]
pub struct KSelection {
    /// Candidate with the highest silhouette score (lowest k on ties)
    pub best_k: usize,
    /// Silhouette score for every candidate tried
    pub scores: BTreeMap<usize, f64>,
}

impl KSelection {
    pub fn best_score(&self) -> Option<f64> {
        self.scores.get(&self.best_k).copied()
    }
}

/// Fit K-Means with a seeded initialization and label every row.
///
/// `n_clusters` must be at least 1 and no more than the number of distinct
/// rows. The UI-level bound `2..=n-1` is left to the caller.
pub fn fit_kmeans(
    features: &Array2<f64>,
    n_clusters: usize,
    config: &ClusterConfig,
) -> Result<KMeansModel> {
    if n_clusters == 0 {
        return Err(SegmentError::InvalidParameter(
            "number of clusters must be at least 1".to_string(),
        ));
    }

    let n_samples = features.nrows();
    if n_samples < n_clusters {
        return Err(SegmentError::InsufficientData(format!(
            "number of data points ({}) must be at least equal to number of clusters ({})",
            n_samples, n_clusters
        )));
    }

    let distinct = distinct_rows(features);
    if distinct < n_clusters {
        return Err(SegmentError::InsufficientData(format!(
            "only {} distinct data points for {} clusters",
            distinct, n_clusters
        )));
    }

    let dataset = DatasetBase::from(features.clone());
    let rng = StdRng::seed_from_u64(config.seed);

    let model = KMeans::params_with(n_clusters, rng, L2Dist)
        .max_n_iterations(config.max_iters)
        .tolerance(config.tolerance)
        .n_runs(config.n_runs)
        .fit(&dataset)
        .map_err(|e| SegmentError::Clustering(e.to_string()))?;

    let labels: Array1<usize> = model.predict(features);
    let centroids = model.centroids().clone();
    let inertia = compute_inertia(features, &labels, &centroids);

    debug!(n_clusters, inertia, "fitted k-means");

    Ok(KMeansModel {
        n_clusters,
        labels,
        centroids,
        inertia,
    })
}

/// Mean silhouette coefficient over all points.
///
/// Points alone in their cluster score 0. Returns `None` when fewer than two
/// distinct labels are present, since the score is undefined there.
pub fn silhouette_score(features: &Array2<f64>, labels: &Array1<usize>) -> Option<f64> {
    let n_samples = features.nrows();
    let n_labels = labels.iter().max().map_or(0, |&max| max + 1);
    let distinct = labels.iter().collect::<HashSet<_>>().len();
    if n_samples < 2 || distinct < 2 || labels.len() != n_samples {
        return None;
    }

    let mut silhouette_sum = 0.0;

    for i in 0..n_samples {
        let point = features.row(i);
        let cluster_label = labels[i];

        let mut sums = vec![0.0; n_labels];
        let mut counts = vec![0usize; n_labels];

        for j in 0..n_samples {
            if i == j {
                continue;
            }
            let distance = euclidean_distance(&point, &features.row(j));
            sums[labels[j]] += distance;
            counts[labels[j]] += 1;
        }

        if counts[cluster_label] == 0 {
            // Singleton cluster
            continue;
        }

        // a(i): mean distance to points in same cluster
        let a_i = sums[cluster_label] / counts[cluster_label] as f64;

        // b(i): min mean distance to points in other clusters
        let b_i = (0..n_labels)
            .filter(|&label| label != cluster_label && counts[label] > 0)
            .map(|label| sums[label] / counts[label] as f64)
            .fold(f64::INFINITY, f64::min);

        let denominator = a_i.max(b_i);
        if denominator > 0.0 && b_i.is_finite() {
            silhouette_sum += (b_i - a_i) / denominator;
        }
    }

    Some(silhouette_sum / n_samples as f64)
}

/// Score every k in `[k_min, min(k_max, n - 1)]` by silhouette and pick the best.
///
/// Candidates that collapse to a single label score [`COLLAPSED_SCORE`]. A
/// later candidate replaces the current best only with a strictly greater score.
pub fn select_k(
    features: &Array2<f64>,
    k_min: usize,
    k_max: usize,
    config: &ClusterConfig,
) -> Result<KSelection> {
    if k_min < 2 {
        return Err(SegmentError::InvalidParameter(format!(
            "k_min must be at least 2, got {}",
            k_min
        )));
    }

    let n_samples = features.nrows();
    let effective_max = k_max.min(n_samples.saturating_sub(1));
    if k_min > effective_max {
        return Err(SegmentError::InsufficientData(format!(
            "{} customers cannot be scored for k >= {} (largest usable k is {})",
            n_samples, k_min, effective_max
        )));
    }

    let distinct = distinct_rows(features);
    let mut scores = BTreeMap::new();

    for k in k_min..=effective_max {
        if k > distinct {
            warn!(k, distinct, "fewer distinct customers than clusters, scoring as collapsed");
            scores.insert(k, COLLAPSED_SCORE);
            continue;
        }

        let model = fit_kmeans(features, k, config)?;
        let score = if model.distinct_labels() < 2 {
            None
        } else {
            silhouette_score(features, &model.labels)
        };

        match score {
            Some(score) => {
                debug!(k, score, "silhouette score");
                scores.insert(k, score);
            }
            None => {
                warn!(k, "labels collapsed to a single cluster");
                scores.insert(k, COLLAPSED_SCORE);
            }
        }
    }

    let best_k = best_candidate(k_min, &scores);
    info!(
        best_k,
        best_score = scores.get(&best_k).copied().unwrap_or(COLLAPSED_SCORE),
        candidates = scores.len(),
        "selected cluster count"
    );
    Ok(KSelection { best_k, scores })
}

/// Lowest k holding the highest score. A candidate only replaces the current
/// best with a strictly greater score, so collapsed candidates never win and
/// `fallback` stands when nothing beats [`COLLAPSED_SCORE`].
fn best_candidate(fallback: usize, scores: &BTreeMap<usize, f64>) -> usize {
    let mut best_k = fallback;
    let mut best_score = COLLAPSED_SCORE;
    for (&k, &score) in scores {
        if score > best_score {
            best_score = score;
            best_k = k;
        }
    }
    best_k
}

/// Predict the cluster of raw (unscaled) RFM values
pub fn predict_cluster(
    model: &KMeansModel,
    scaler: &StandardScaler,
    rfm_values: &[f64; 3],
) -> Result<usize> {
    let raw = Array1::from(rfm_values.to_vec());
    let scaled = scaler.transform_row(raw.view())?;
    model.predict(scaled.view())
}

/// Compute within-cluster sum of squares (inertia)
fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    let mut inertia = 0.0;

    for (i, &cluster) in labels.iter().enumerate() {
        if cluster < centroids.nrows() {
            let distance = euclidean_distance(&features.row(i), &centroids.row(cluster));
            inertia += distance * distance;
        }
    }

    inertia
}

fn distinct_rows(features: &Array2<f64>) -> usize {
    features
        .outer_iter()
        .map(|row| row.iter().map(|v| v.to_bits()).collect::<Vec<u64>>())
        .collect::<HashSet<_>>()
        .len()
}

/// Calculate Euclidean distance between two points
fn euclidean_distance(point1: &ArrayView1<f64>, point2: &ArrayView1<f64>) -> f64 {
    point1
        .iter()
        .zip(point2.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}
