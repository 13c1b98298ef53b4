//! UTF-8 CSV export of cluster assignments and summaries

use crate::error::{Result, SegmentError};
use crate::pipeline::ClusterAssignment;
use crate::summary::ClusterSummary;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct AssignmentRecord<'a> {
    #[serde(rename = "CustomerID")]
    customer_id: &'a str,
    #[serde(rename = "Recency")]
    recency: i64,
    #[serde(rename = "Frequency")]
    frequency: usize,
    #[serde(rename = "Monetary")]
    monetary: f64,
    #[serde(rename = "Cluster")]
    cluster: usize,
}

impl<'a> From<&'a ClusterAssignment> for AssignmentRecord<'a> {
    fn from(assignment: &'a ClusterAssignment) -> Self {
        AssignmentRecord {
            customer_id: &assignment.rfm.customer_id,
            recency: assignment.rfm.recency,
            frequency: assignment.rfm.frequency,
            monetary: assignment.rfm.monetary,
            cluster: assignment.cluster,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SummaryRecord {
    cluster: usize,
    recency_median: f64,
    frequency_median: f64,
    monetary_median: f64,
    count: usize,
}

impl From<&ClusterSummary> for SummaryRecord {
    fn from(summary: &ClusterSummary) -> Self {
        SummaryRecord {
            cluster: summary.cluster,
            recency_median: summary.recency_median,
            frequency_median: summary.frequency_median,
            monetary_median: summary.monetary_median,
            count: summary.count,
        }
    }
}

/// Write `CustomerID,Recency,Frequency,Monetary,Cluster` rows in assignment order
pub fn write_assignments<W: Write>(writer: W, assignments: &[ClusterAssignment]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if assignments.is_empty() {
        csv_writer.write_record(["CustomerID", "Recency", "Frequency", "Monetary", "Cluster"])?;
    }
    for assignment in assignments {
        csv_writer.serialize(AssignmentRecord::from(assignment))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write per-cluster medians and counts
pub fn write_summary<W: Write>(writer: W, summary: &[ClusterSummary]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if summary.is_empty() {
        csv_writer.write_record([
            "Cluster",
            "RecencyMedian",
            "FrequencyMedian",
            "MonetaryMedian",
            "Count",
        ])?;
    }
    for row in summary {
        csv_writer.serialize(SummaryRecord::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Assignments rendered as an in-memory CSV document
pub fn assignments_to_csv(assignments: &[ClusterAssignment]) -> Result<String> {
    let mut buffer = Vec::new();
    write_assignments(&mut buffer, assignments)?;
    String::from_utf8(buffer).map_err(|e| SegmentError::Parse(e.to_string()))
}

pub fn save_assignments(path: &Path, assignments: &[ClusterAssignment]) -> Result<()> {
    let file = File::create(path)?;
    write_assignments(file, assignments)
}

pub fn save_summary(path: &Path, summary: &[ClusterSummary]) -> Result<()> {
    let file = File::create(path)?;
    write_summary(file, summary)
}
