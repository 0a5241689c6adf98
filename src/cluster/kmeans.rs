use crate::cluster::distance::euclidean_distance;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::metrics::{self, ClusterPurity};
use crate::{ArrayView1, Matrix};
use ndarray::{Array1, Axis};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Row indices of the samples in each cluster; `groups[k]` belongs to centroid `k`.
pub type Groups = Vec<Vec<usize>>;

/// Outcome of a single [`repair`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repair {
    /// No cluster was empty.
    Clean,
    /// One sample moved from cluster `from` into the empty cluster `to`.
    Moved { from: usize, to: usize },
    /// Cluster `empty` is empty and no cluster has a sample to spare.
    Stuck { empty: usize },
}

impl Repair {
    pub fn had_empty(&self) -> bool {
        !matches!(self, Repair::Clean)
    }
}

/// Diagnostics recorded after one pass of the clustering loop.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationReport {
    /// 1-based iteration number.
    pub iteration: usize,
    pub sum_of_distances: f64,
    pub purity: Vec<ClusterPurity>,
    /// Centroids differ from the previous iteration's.
    pub changed: bool,
    /// The repair step had to fill at least one empty cluster.
    pub had_empty: bool,
}

#[derive(Clone, Debug)]
pub struct KMeans {
    pub cluster_centers: Option<Matrix>,
    pub groups: Option<Groups>,
    pub labels: Option<Vec<usize>>,
    pub sum_of_distances: Option<f64>,
    pub n_iter: Option<usize>,
    pub converged: Option<bool>,
    /// Seed actually used by the last `fit`, including a drawn one.
    pub seed: Option<u64>,
    pub history: Vec<IterationReport>,
    n_clusters: usize,
    max_iter: usize,
    random_state: Option<u64>,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            cluster_centers: None,
            groups: None,
            labels: None,
            sum_of_distances: None,
            n_iter: None,
            converged: None,
            seed: None,
            history: Vec::new(),
            n_clusters,
            max_iter: 300,
            random_state: None,
        }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Run Lloyd iterations until two consecutive centroid sets are equal
    /// and no cluster had to be repaired, or until `max_iter` passes.
    ///
    /// Hitting `max_iter` is not an error: the last state is kept and
    /// `converged` is set to `false`.
    pub fn fit(&mut self, data: &Dataset) -> Result<()> {
        let x = &data.features;
        let n_samples = x.nrows();

        if self.n_clusters == 0 || self.n_clusters >= n_samples {
            return Err(Error::InvalidClusterCount {
                requested: self.n_clusters,
                n_items: n_samples,
            });
        }

        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be > 0",
            });
        }

        let seed = self.random_state.unwrap_or_else(rand::random);
        log::info!(
            "k-means: k={} on {} samples x {} features (seed {})",
            self.n_clusters,
            n_samples,
            x.ncols(),
            seed
        );

        let mut rng = StdRng::seed_from_u64(seed);
        let mut centroids = initialize_centroids(x, self.n_clusters, &mut rng)?;
        let mut groups: Groups = vec![Vec::new(); self.n_clusters];
        let mut history = Vec::new();
        let mut converged = false;

        for iteration in 1..=self.max_iter {
            groups = assign(x, &centroids)?;
            let had_empty = repair_empty_clusters(&mut groups)?;

            let next = update_centroids(x, &groups)?;
            let changed = !centroids_equal(&centroids, &next);
            centroids = next;

            let sum = metrics::sum_of_distances(x, &groups, &centroids)?;
            log::debug!(
                "iteration {:>4}  sum of distances {:.4}  changed {}  repaired {}",
                iteration,
                sum,
                changed,
                had_empty
            );

            history.push(IterationReport {
                iteration,
                sum_of_distances: sum,
                purity: metrics::purity(data, &groups),
                changed,
                had_empty,
            });

            if !changed && !had_empty {
                converged = true;
                break;
            }
        }

        if converged {
            log::info!("k-means converged after {} iterations", history.len());
        } else {
            log::warn!("k-means stopped at max_iter={} without converging", self.max_iter);
        }

        let mut labels = vec![0; n_samples];
        for (cluster, members) in groups.iter().enumerate() {
            for &idx in members {
                labels[idx] = cluster;
            }
        }

        self.sum_of_distances = history.last().map(|report| report.sum_of_distances);
        self.n_iter = Some(history.len());
        self.converged = Some(converged);
        self.seed = Some(seed);
        self.history = history;
        self.cluster_centers = Some(centroids);
        self.groups = Some(groups);
        self.labels = Some(labels);

        Ok(())
    }

    pub fn fit_predict(&mut self, data: &Dataset) -> Result<Vec<usize>> {
        self.fit(data)?;
        self.labels.clone().ok_or(Error::NotFitted)
    }

    /// Assign new observations to the nearest fitted centroid.
    pub fn predict(&self, x: &Matrix) -> Result<Vec<usize>> {
        let centroids = self.cluster_centers.as_ref().ok_or(Error::NotFitted)?;

        if x.ncols() != centroids.ncols() {
            return Err(Error::DimensionMismatch {
                expected: centroids.ncols(),
                found: x.ncols(),
            });
        }

        x.outer_iter()
            .map(|row| nearest_centroid(row, centroids))
            .collect()
    }

    /// Per-cluster label entropy of the fitted partition.
    pub fn entropy(&self, data: &Dataset) -> Result<Vec<f64>> {
        let groups = self.groups.as_ref().ok_or(Error::NotFitted)?;
        Ok(metrics::entropy(data, groups))
    }
}

/// Pick `k` rows uniformly at random, with replacement, as starting centroids.
pub fn initialize_centroids<R: Rng + ?Sized>(features: &Matrix, k: usize, rng: &mut R) -> Result<Matrix> {
    if k == 0 || features.nrows() == 0 {
        return Err(Error::InvalidClusterCount {
            requested: k,
            n_items: features.nrows(),
        });
    }

    let picks = Array1::random_using(k, Uniform::new(0, features.nrows()), rng);
    Ok(features.select(Axis(0), &picks.to_vec()))
}

/// Put every row in the group of its nearest centroid. Ties go to the lower index.
pub fn assign(features: &Matrix, centroids: &Matrix) -> Result<Groups> {
    if centroids.nrows() == 0 {
        return Err(Error::InvalidClusterCount {
            requested: 0,
            n_items: features.nrows(),
        });
    }

    let mut groups: Groups = vec![Vec::new(); centroids.nrows()];
    for (idx, row) in features.outer_iter().enumerate() {
        groups[nearest_centroid(row, centroids)?].push(idx);
    }
    Ok(groups)
}

/// Fill the first empty group with the last member of the first group that
/// has at least two members. Moves at most one sample per call.
///
/// A single-member group is never a donor: taking its only sample would just
/// move the hole, and repeated calls could trade it back and forth forever.
pub fn repair(groups: &mut Groups) -> Repair {
    let Some(empty) = groups.iter().position(Vec::is_empty) else {
        return Repair::Clean;
    };
    let Some(donor) = groups.iter().position(|members| members.len() > 1) else {
        return Repair::Stuck { empty };
    };

    if let Some(idx) = groups[donor].pop() {
        groups[empty].push(idx);
    }
    Repair::Moved {
        from: donor,
        to: empty,
    }
}

/// Coordinate-wise mean of every group. Members are summed in order, so equal
/// groups always give bit-identical centroids.
pub fn update_centroids(features: &Matrix, groups: &Groups) -> Result<Matrix> {
    let mut centroids = Matrix::zeros((groups.len(), features.ncols()));

    for (cluster, members) in groups.iter().enumerate() {
        if members.is_empty() {
            return Err(Error::EmptyCluster { cluster });
        }

        let mut centroid = centroids.row_mut(cluster);
        for &idx in members {
            centroid += &features.row(idx);
        }
        centroid /= members.len() as f64;

        if centroid.iter().any(|v| !v.is_finite()) {
            return Err(Error::NonFiniteCentroid { cluster });
        }
    }

    Ok(centroids)
}

/// Exact element-wise equality of two centroid sets.
pub fn centroids_equal(prev: &Matrix, next: &Matrix) -> bool {
    prev == next
}

// Repeats `repair` until no group is empty; reports whether anything moved.
fn repair_empty_clusters(groups: &mut Groups) -> Result<bool> {
    let mut had_empty = false;
    loop {
        match repair(groups) {
            Repair::Clean => return Ok(had_empty),
            Repair::Moved { from, to } => {
                log::trace!("moved one sample from cluster {} to empty cluster {}", from, to);
                had_empty = true;
            }
            Repair::Stuck { empty } => return Err(Error::RepairStuck { cluster: empty }),
        }
    }
}

fn nearest_centroid(point: ArrayView1<f64>, centroids: &Matrix) -> Result<usize> {
    let mut min_distance = f64::INFINITY;
    let mut closest_cluster = 0;

    for (k, centroid) in centroids.outer_iter().enumerate() {
        let distance = euclidean_distance(point, centroid)?;
        if distance < min_distance {
            min_distance = distance;
            closest_cluster = k;
        }
    }

    Ok(closest_cluster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_blobs() -> Dataset {
        let features = array![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]];
        let labels = ["A", "A", "B", "B"].iter().map(|s| s.to_string()).collect();
        Dataset::new(features, labels).unwrap()
    }

    #[test]
    fn test_kmeans_separates_blobs_for_any_seed() {
        let data = two_blobs();

        for seed in 0..32 {
            let mut kmeans = KMeans::new(2).random_state(seed);
            let labels = kmeans.fit_predict(&data).unwrap();

            assert_eq!(kmeans.converged, Some(true));
            assert_eq!(labels[0], labels[1]);
            assert_eq!(labels[2], labels[3]);
            assert_ne!(labels[0], labels[2]);

            let entropy = kmeans.entropy(&data).unwrap();
            assert_eq!(entropy, vec![0.0, 0.0]);
            assert!((kmeans.sum_of_distances.unwrap() - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_kmeans_final_iteration_is_stable() {
        let data = two_blobs();
        let mut kmeans = KMeans::new(2).random_state(7);
        kmeans.fit(&data).unwrap();

        let last = kmeans.history.last().unwrap();
        assert!(!last.changed);
        assert!(!last.had_empty);
        assert_eq!(kmeans.n_iter, Some(kmeans.history.len()));
        assert_eq!(kmeans.seed, Some(7));
    }

    #[test]
    fn test_kmeans_same_seed_same_run() {
        let data = two_blobs();
        let mut first = KMeans::new(3).random_state(11);
        let mut second = KMeans::new(3).random_state(11);
        first.fit(&data).unwrap();
        second.fit(&data).unwrap();

        assert_eq!(first.cluster_centers, second.cluster_centers);
        assert_eq!(first.groups, second.groups);
        assert_eq!(first.history, second.history);
    }

    #[test]
    fn test_kmeans_invalid_clusters() {
        let data = two_blobs();

        for k in [0, 4, 5] {
            let mut kmeans = KMeans::new(k);
            assert!(matches!(
                kmeans.fit(&data),
                Err(Error::InvalidClusterCount { n_items: 4, .. })
            ));
        }
        assert!(KMeans::new(3).random_state(0).fit(&data).is_ok());
    }

    #[test]
    fn test_kmeans_zero_max_iter() {
        let data = two_blobs();
        let mut kmeans = KMeans::new(2).max_iter(0);
        assert!(matches!(
            kmeans.fit(&data),
            Err(Error::InvalidParameter { name: "max_iter", .. })
        ));
    }

    #[test]
    fn test_kmeans_iteration_cap() {
        let data = two_blobs();
        let mut kmeans = KMeans::new(2).random_state(3).max_iter(1);
        kmeans.fit(&data).unwrap();

        assert_eq!(kmeans.converged, Some(false));
        assert_eq!(kmeans.n_iter, Some(1));
        assert_eq!(kmeans.history.len(), 1);
    }

    #[test]
    fn test_kmeans_too_few_distinct_points_hits_cap() {
        // Only two distinct locations, so a third centroid always loses every tie.
        let features = array![[0.0], [0.0], [0.0], [0.0], [0.0], [1.0]];
        let labels = (0..6).map(|i| format!("l{}", i % 2)).collect();
        let data = Dataset::new(features, labels).unwrap();

        let mut kmeans = KMeans::new(3).random_state(5).max_iter(25);
        kmeans.fit(&data).unwrap();

        assert_eq!(kmeans.converged, Some(false));
        assert_eq!(kmeans.n_iter, Some(25));
        for members in kmeans.groups.as_ref().unwrap() {
            assert!(!members.is_empty());
        }
    }

    #[test]
    fn test_kmeans_predict() {
        let data = two_blobs();
        let mut kmeans = KMeans::new(2).random_state(1);
        let labels = kmeans.fit_predict(&data).unwrap();

        assert_eq!(kmeans.predict(&data.features).unwrap(), labels);

        let x_test = array![[0.5, 0.5], [10.5, 10.5]];
        let predicted = kmeans.predict(&x_test).unwrap();
        assert_eq!(predicted, vec![labels[0], labels[2]]);
    }

    #[test]
    fn test_kmeans_predict_without_fit() {
        let kmeans = KMeans::new(2);
        assert!(matches!(
            kmeans.predict(&array![[1.0, 2.0]]),
            Err(Error::NotFitted)
        ));
        assert!(matches!(kmeans.entropy(&two_blobs()), Err(Error::NotFitted)));
    }

    #[test]
    fn test_kmeans_dimension_mismatch() {
        let data = two_blobs();
        let mut kmeans = KMeans::new(2).random_state(0);
        kmeans.fit(&data).unwrap();

        assert!(matches!(
            kmeans.predict(&array![[1.0, 2.0, 3.0]]),
            Err(Error::DimensionMismatch { expected: 2, found: 3 })
        ));
    }

    #[test]
    fn test_initialize_picks_rows() {
        let data = two_blobs();
        let mut rng = StdRng::seed_from_u64(42);
        let centroids = initialize_centroids(&data.features, 3, &mut rng).unwrap();

        assert_eq!(centroids.shape(), &[3, 2]);
        for centroid in centroids.outer_iter() {
            assert!(data.features.outer_iter().any(|row| row == centroid));
        }
    }

    #[test]
    fn test_assign_ties_go_to_lowest_index() {
        let features = array![[0.0], [5.0]];
        let centroids = array![[-1.0], [1.0], [5.0], [5.0]];

        let groups = assign(&features, &centroids).unwrap();
        assert_eq!(groups, vec![vec![0], vec![], vec![1], vec![]]);
    }

    #[test]
    fn test_repair_moves_one_sample_per_call() {
        let mut groups = vec![vec![0, 1, 2], vec![], vec![]];

        assert_eq!(repair(&mut groups), Repair::Moved { from: 0, to: 1 });
        assert_eq!(groups, vec![vec![0, 1], vec![2], vec![]]);

        assert_eq!(repair(&mut groups), Repair::Moved { from: 0, to: 2 });
        assert_eq!(groups, vec![vec![0], vec![2], vec![1]]);

        assert_eq!(repair(&mut groups), Repair::Clean);
        assert!(!Repair::Clean.had_empty());
    }

    #[test]
    fn test_repair_skips_singleton_donor() {
        let mut groups = vec![vec![5], vec![], vec![1, 2]];

        let outcome = repair(&mut groups);
        assert_eq!(outcome, Repair::Moved { from: 2, to: 1 });
        assert!(outcome.had_empty());
        assert_eq!(groups, vec![vec![5], vec![2], vec![1]]);
    }

    #[test]
    fn test_repair_stuck_is_noop() {
        let mut groups = vec![vec![0], vec![]];

        assert_eq!(repair(&mut groups), Repair::Stuck { empty: 1 });
        assert_eq!(groups, vec![vec![0], vec![]]);
        assert!(matches!(
            repair_empty_clusters(&mut groups),
            Err(Error::RepairStuck { cluster: 1 })
        ));
    }

    #[test]
    fn test_update_centroids_mean() {
        let features = array![[1.0, 2.0], [3.0, 6.0], [5.0, 1.0], [7.0, 7.0]];
        let groups = vec![vec![0, 1, 3], vec![2]];

        let centroids = update_centroids(&features, &groups).unwrap();
        assert_eq!(centroids, array![[11.0 / 3.0, 5.0], [5.0, 1.0]]);
    }

    #[test]
    fn test_update_centroids_empty_group() {
        let features = array![[1.0], [2.0]];
        let groups = vec![vec![0, 1], vec![]];

        assert!(matches!(
            update_centroids(&features, &groups),
            Err(Error::EmptyCluster { cluster: 1 })
        ));
    }

    #[test]
    fn test_centroids_equal_is_exact() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let mut b = a.clone();
        assert!(centroids_equal(&a, &b));

        b[[1, 1]] += 1e-12;
        assert!(!centroids_equal(&a, &b));
        assert!(!centroids_equal(&a, &array![[1.0, 2.0]]));
    }
}
