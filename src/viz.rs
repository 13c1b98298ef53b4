//! Visualization functions using Plotters for cluster analysis

use crate::model::KSelection;
use crate::pipeline::{ClusterAssignment, SegmentationReport};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Color palette for different clusters
const CLUSTER_COLORS: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

fn cluster_color(cluster: usize) -> RGBColor {
    CLUSTER_COLORS[cluster % CLUSTER_COLORS.len()]
}

/// Axis range covering `values` with a margin; never empty
fn padded_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let pad = (max - min) * 0.05 + 0.5;
    (min - pad)..(max + pad)
}

/// Scatter plot of Frequency vs Monetary, colored by cluster
pub fn create_cluster_visualization(
    assignments: &[ClusterAssignment],
    output_path: &Path,
    plot_title: Option<&str>,
) -> anyhow::Result<()> {
    let title = plot_title.unwrap_or("Customer Segments (Frequency vs Monetary)");

    let x_range = padded_range(assignments.iter().map(|a| a.rfm.frequency as f64));
    let y_range = padded_range(assignments.iter().map(|a| a.rfm.monetary));
    let n_clusters = assignments.iter().map(|a| a.cluster + 1).max().unwrap_or(0);

    let root = SVGBackend::new(output_path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Frequency (unique invoices)")
        .y_desc("Monetary (total spend)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for cluster in 0..n_clusters {
        let color = cluster_color(cluster);
        let points = assignments
            .iter()
            .filter(|a| a.cluster == cluster)
            .map(|a| (a.rfm.frequency as f64, a.rfm.monetary));

        chart
            .draw_series(points.map(|point| Circle::new(point, 4, color.mix(0.8).filled())))?
            .label(format!("Cluster {}", cluster))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Line chart of silhouette score by candidate cluster count
pub fn create_silhouette_chart(selection: &KSelection, output_path: &Path) -> anyhow::Result<()> {
    let points: Vec<(f64, f64)> = selection
        .scores
        .iter()
        .map(|(&k, &score)| (k as f64, score))
        .collect();
    let x_range = padded_range(points.iter().map(|&(k, _)| k));

    let root = SVGBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Silhouette score by number of clusters", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, -1.0f64..1.0f64)?;

    chart
        .configure_mesh()
        .x_desc("Number of clusters (k)")
        .y_desc("Silhouette score")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(LineSeries::new(points.clone(), &BLUE))?;
    chart.draw_series(points.iter().map(|&(k, score)| {
        let color = if k as usize == selection.best_k { RED } else { BLUE };
        Circle::new((k, score), 4, color.filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Path of the silhouette chart written next to the scatter plot
pub fn silhouette_chart_path(plot_path: &Path) -> PathBuf {
    let stem = plot_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cluster_plot".to_string());
    plot_path.with_file_name(format!("{}_silhouette.svg", stem))
}

/// Write the scatter plot and, when scores exist, the silhouette chart
pub fn generate_visualization_report(
    report: &SegmentationReport,
    plot_path: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = vec![plot_path.to_path_buf()];
    create_cluster_visualization(&report.assignments, plot_path, None)?;

    if let Some(selection) = &report.selection {
        let silhouette_path = silhouette_chart_path(plot_path);
        create_silhouette_chart(selection, &silhouette_path)?;
        written.push(silhouette_path);
    }

    Ok(written)
}
