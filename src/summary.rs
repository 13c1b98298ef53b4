//! Per-cluster aggregate statistics

use crate::pipeline::ClusterAssignment;
use std::collections::BTreeMap;

/// Medians and size of one cluster
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub recency_median: f64,
    pub frequency_median: f64,
    pub monetary_median: f64,
    pub count: usize,
}

/// Median of a non-empty sample; even counts average the two middle values
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Group assignments by cluster label, ascending
pub fn summarize(assignments: &[ClusterAssignment]) -> Vec<ClusterSummary> {
    let mut groups: BTreeMap<usize, Vec<&ClusterAssignment>> = BTreeMap::new();
    for assignment in assignments {
        groups.entry(assignment.cluster).or_default().push(assignment);
    }

    groups
        .into_iter()
        .map(|(cluster, members)| ClusterSummary {
            cluster,
            recency_median: median(members.iter().map(|m| m.rfm.recency as f64).collect()),
            frequency_median: median(members.iter().map(|m| m.rfm.frequency as f64).collect()),
            monetary_median: median(members.iter().map(|m| m.rfm.monetary).collect()),
            count: members.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfm::CustomerRfm;

    fn assignment(cluster: usize, recency: i64, frequency: usize, monetary: f64) -> ClusterAssignment {
        ClusterAssignment {
            rfm: CustomerRfm {
                customer_id: format!("{}-{}", cluster, recency),
                recency,
                frequency,
                monetary,
            },
            cluster,
        }
    }

    #[test]
    fn test_summarize_medians() {
        let assignments = vec![
            assignment(1, 300, 1, 10.0),
            assignment(0, 1, 5, 500.0),
            assignment(0, 3, 7, 700.0),
            assignment(1, 200, 2, 30.0),
            assignment(1, 250, 1, 20.0),
            assignment(0, 2, 6, 900.0),
            assignment(0, 10, 4, 100.0),
        ];
        let summary = summarize(&assignments);

        assert_eq!(summary.len(), 2);
        assert_eq!(
            summary[0],
            ClusterSummary {
                cluster: 0,
                recency_median: 2.5,
                frequency_median: 5.5,
                monetary_median: 600.0,
                count: 4,
            }
        );
        assert_eq!(summary[1].cluster, 1);
        assert_eq!(summary[1].recency_median, 250.0);
        assert_eq!(summary[1].frequency_median, 1.0);
        assert_eq!(summary[1].count, 3);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
    }
}
