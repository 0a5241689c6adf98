//! Cluster quality diagnostics.
//!
//! These compare a partition against the dataset's ground-truth labels. They
//! only read the partition and never influence clustering.

use crate::Matrix;
use crate::cluster::{Groups, euclidean_distance};
use crate::dataset::Dataset;
use crate::error::{Error, Result};

/// Label make-up of one cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterPurity {
    /// Number of members.
    pub size: usize,
    /// `(label, percentage of members)` for every label present, in
    /// [`Dataset::classes`] order.
    pub shares: Vec<(String, f64)>,
}

impl ClusterPurity {
    /// The most frequent label and its percentage. Ties keep the earlier class.
    pub fn dominant(&self) -> Option<(&str, f64)> {
        self.shares
            .iter()
            .fold(None, |best: Option<(&str, f64)>, (label, pct)| match best {
                Some((_, top)) if top >= *pct => best,
                _ => Some((label.as_str(), *pct)),
            })
    }
}

/// Sum over all clusters of each member's distance to its cluster's centroid.
pub fn sum_of_distances(features: &Matrix, groups: &Groups, centroids: &Matrix) -> Result<f64> {
    if groups.len() != centroids.nrows() {
        return Err(Error::DimensionMismatch {
            expected: centroids.nrows(),
            found: groups.len(),
        });
    }

    let mut sum = 0.0;
    for (cluster, members) in groups.iter().enumerate() {
        let centroid = centroids.row(cluster);
        for &idx in members {
            sum += euclidean_distance(features.row(idx), centroid)?;
        }
    }
    Ok(sum)
}

/// Percentage of each label within each cluster.
pub fn purity(dataset: &Dataset, groups: &Groups) -> Vec<ClusterPurity> {
    groups
        .iter()
        .map(|members| {
            let size = members.len();
            let shares = label_counts(dataset, members)
                .into_iter()
                .enumerate()
                .filter(|&(_, count)| count > 0)
                .map(|(class, count)| {
                    let pct = count as f64 / size as f64 * 100.0;
                    (dataset.classes()[class].clone(), pct)
                })
                .collect();
            ClusterPurity { size, shares }
        })
        .collect()
}

/// Shannon entropy, in bits, of the label distribution of every cluster.
pub fn entropy(dataset: &Dataset, groups: &Groups) -> Vec<f64> {
    groups
        .iter()
        .map(|members| group_entropy(dataset, members))
        .collect()
}

/// Shannon entropy of one cluster's labels. An empty cluster has entropy 0.
pub fn group_entropy(dataset: &Dataset, members: &[usize]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }

    let size = members.len() as f64;
    label_counts(dataset, members)
        .into_iter()
        .filter(|&count| count > 0)
        .fold(0.0, |acc, count| {
            let p = count as f64 / size;
            acc - p * p.log2()
        })
}

fn label_counts(dataset: &Dataset, members: &[usize]) -> Vec<usize> {
    let mut counts = vec![0; dataset.classes().len()];
    for &idx in members {
        counts[dataset.labels()[idx]] += 1;
    }
    counts
}
