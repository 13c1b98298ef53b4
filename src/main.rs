//! rfm-segment: Customer segmentation CLI using K-Means clustering on RFM analysis
//!
//! This is the main entrypoint that orchestrates data loading, cluster-count
//! selection, model fitting, export, visualization, and prediction.

use anyhow::{Context, Result};
use clap::Parser;
use rfm_segment::{export, predict_cluster, segment_file, summarize, viz, Args, SegmentationReport};
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        println!("rfm-segment - Customer Segmentation using K-Means");
        println!("=================================================\n");
    }

    // Check if in prediction mode
    if let Some(rfm_values) = args.parse_rfm_values()? {
        run_prediction_mode(&args, rfm_values)?;
    } else {
        run_full_pipeline(&args)?;
    }

    Ok(())
}

/// Logs go to stderr so stdout stays a clean report
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_segmentation(args: &Args) -> Result<SegmentationReport> {
    let config = args.pipeline_config()?;
    segment_file(Path::new(&args.input), &config)
        .with_context(|| format!("failed to segment customers from {}", args.input))
}

/// Run prediction mode for a single customer
fn run_prediction_mode(args: &Args, rfm_values: [f64; 3]) -> Result<()> {
    println!("=== Prediction Mode ===");
    println!(
        "Input RFM values: R={}, F={}, M={}",
        rfm_values[0], rfm_values[1], rfm_values[2]
    );

    let start_time = Instant::now();
    let report = run_segmentation(args)?;
    let cluster = predict_cluster(&report.model, &report.scaler, &rfm_values)?;
    let elapsed = start_time.elapsed();

    println!("\n✓ Predicted Cluster: {}", cluster);
    println!("  Processing time: {:.2}s", elapsed.as_secs_f64());

    // Show cluster context
    let cluster_sizes = report.model.cluster_sizes();
    let total_customers = report.assignments.len();
    let cluster_percentage = (cluster_sizes[cluster] as f64 / total_customers as f64) * 100.0;

    println!("\nCluster {} details:", cluster);
    println!(
        "  Size: {} customers ({:.1}% of total)",
        cluster_sizes[cluster], cluster_percentage
    );
    println!(
        "  Centroid (normalized): R={:.2}, F={:.2}, M={:.2}",
        report.model.centroids[[cluster, 0]],
        report.model.centroids[[cluster, 1]],
        report.model.centroids[[cluster, 2]]
    );

    Ok(())
}

/// Run full clustering pipeline
fn run_full_pipeline(args: &Args) -> Result<()> {
    println!("=== Full Clustering Pipeline ===\n");

    let start_time = Instant::now();
    let report = run_segmentation(args)?;

    println!(
        "✓ Data loaded: {} transactions, {} customers",
        report.transactions,
        report.assignments.len()
    );

    if let Some(selection) = &report.selection {
        println!("\n=== Silhouette Scores ===");
        for (k, score) in &selection.scores {
            let marker = if *k == selection.best_k { "  <- suggested" } else { "" };
            println!("k = {:2}: {:.3}{}", k, score, marker);
        }
    }
    println!("\nUsing {} clusters", report.n_clusters);
    if args.verbose {
        println!("  Inertia: {:.2}", report.model.inertia);
    }

    println!("\n=== Cluster Statistics ===");
    let total_customers = report.assignments.len();
    for (i, &size) in report.model.cluster_sizes().iter().enumerate() {
        let percentage = (size as f64 / total_customers as f64) * 100.0;
        println!("Cluster {}: {} customers ({:.1}%)", i, size, percentage);
    }

    let summary = summarize(&report.assignments);
    println!("\n=== Cluster Summary (medians) ===");
    println!("  Cluster | Recency | Frequency |   Monetary | Count");
    println!("  --------|---------|-----------|------------|------");
    for row in &summary {
        println!(
            "  {:7} | {:7.1} | {:9.1} | {:10.2} | {:5}",
            row.cluster, row.recency_median, row.frequency_median, row.monetary_median, row.count
        );
    }

    export::save_assignments(Path::new(&args.output), &report.assignments)
        .with_context(|| format!("failed to write {}", args.output))?;
    println!("\n✓ Clustered customers saved to: {}", args.output);

    if let Some(summary_path) = &args.summary {
        export::save_summary(Path::new(summary_path), &summary)
            .with_context(|| format!("failed to write {}", summary_path))?;
        println!("✓ Cluster summary saved to: {}", summary_path);
    }

    if let Some(plot_path) = &args.plot {
        let written = viz::generate_visualization_report(&report, Path::new(plot_path))?;
        for path in written {
            println!("✓ Plot saved to: {}", path.display());
        }
    }

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}
