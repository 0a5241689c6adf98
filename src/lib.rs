//! K-means clustering of labeled observations with purity and entropy diagnostics.

pub use ndarray::ArrayView1;

pub mod cluster;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod report;

pub use cluster::{Groups, IterationReport, KMeans, Repair, euclidean_distance};
pub use dataset::{Dataset, Delimiter, LabeledPoint};
pub use error::{Error, Result};
pub use metrics::ClusterPurity;

pub type Matrix = ndarray::Array2<f64>;
