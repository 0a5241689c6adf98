//! Plain-text rendering of clustering diagnostics.
//!
//! Numbers use two decimals and clusters are numbered from 1.

use crate::cluster::IterationReport;
use crate::metrics::ClusterPurity;

pub fn sum_of_distances_line(sum: f64) -> String {
    format!("Sum of distances: {:.2}", sum)
}

/// `Cluster 2: A -> 50.00% B -> 50.00%`
pub fn purity_line(cluster: usize, purity: &ClusterPurity) -> String {
    let shares = purity
        .shares
        .iter()
        .map(|(label, pct)| format!("{} -> {:.2}%", label, pct))
        .collect::<Vec<_>>()
        .join(" ");
    format!("Cluster {}: {}", cluster + 1, shares)
}

pub fn entropy_line(cluster: usize, entropy: f64) -> String {
    format!("Entropy [cluster {}]: {:.2}", cluster + 1, entropy)
}

/// Sum of distances followed by one purity line per cluster.
pub fn iteration(report: &IterationReport) -> String {
    let mut lines = vec![sum_of_distances_line(report.sum_of_distances)];
    lines.extend(
        report
            .purity
            .iter()
            .enumerate()
            .map(|(cluster, purity)| purity_line(cluster, purity)),
    );
    lines.join("\n")
}

pub fn entropy(entropy: &[f64]) -> String {
    entropy
        .iter()
        .enumerate()
        .map(|(cluster, &h)| entropy_line(cluster, h))
        .collect::<Vec<_>>()
        .join("\n")
}
