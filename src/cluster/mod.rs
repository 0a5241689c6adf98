//! K-means clustering.
//!
//! `KMeans` runs Lloyd's algorithm:
//! - pick `k` starting centroids uniformly at random (with replacement)
//! - assign every sample to its nearest centroid
//! - refill empty clusters one sample at a time
//! - move each centroid to the mean of its members
//!
//! and stops once two consecutive centroid sets are exactly equal with no
//! repair in between. Every step is also exposed as a free function.
//!
//! # Examples
//!
//! ```rust
//! use kclust::{Dataset, KMeans};
//! use ndarray::array;
//!
//! let x = array![
//!     [0.0, 0.0],
//!     [0.0, 1.0],
//!     [10.0, 10.0],
//!     [10.0, 11.0]
//! ];
//! let labels = vec!["A", "A", "B", "B"].into_iter().map(String::from).collect();
//! let data = Dataset::new(x, labels).unwrap();
//!
//! let mut kmeans = KMeans::new(2).random_state(42);
//! let clusters = kmeans.fit_predict(&data).unwrap();
//! assert_eq!(clusters[0], clusters[1]);
//! assert_ne!(clusters[0], clusters[2]);
//!
//! let entropy = kmeans.entropy(&data).unwrap();
//! println!("Entropy per cluster: {:?}", entropy);
//! println!("Sum of distances: {:.2}", kmeans.sum_of_distances.unwrap());
//! ```

mod distance;
mod kmeans;

pub use distance::euclidean_distance;
pub use kmeans::{
    Groups, IterationReport, KMeans, Repair, assign, centroids_equal, initialize_centroids,
    repair, update_centroids,
};
