use thiserror::Error;

/// Errors returned by loading, clustering and diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the dataset failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset holds no records.
    #[error("empty input")]
    EmptyInput,

    /// A record's field count differs from the one inferred from the first record.
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        /// 1-based line number.
        line: usize,
        /// Field count of the first record.
        expected: usize,
        /// Field count of this record.
        found: usize,
    },

    /// A feature field is not a finite number.
    #[error("line {line}, column {column}: invalid feature value {value:?}")]
    InvalidFeature {
        /// 1-based line number, or row number for an in-memory matrix.
        line: usize,
        /// 1-based field position.
        column: usize,
        /// Raw field text.
        value: String,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Two vectors or matrices have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// A centroid was requested for a cluster with no members.
    #[error("cluster {cluster} has no members")]
    EmptyCluster {
        /// 0-based cluster id.
        cluster: usize,
    },

    /// A recomputed centroid holds NaN or an infinity.
    #[error("cluster {cluster} produced a non-finite centroid")]
    NonFiniteCentroid {
        /// 0-based cluster id.
        cluster: usize,
    },

    /// An empty cluster exists but no cluster can give up a point.
    #[error("cluster {cluster} is empty and no cluster can donate a point")]
    RepairStuck {
        /// 0-based id of the empty cluster.
        cluster: usize,
    },

    /// The model was used before `fit`.
    #[error("KMeans not fitted. Call fit() first.")]
    NotFitted,
}

impl Error {
    /// True for errors caused by a malformed dataset file.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Error::EmptyInput | Error::FieldCount { .. } | Error::InvalidFeature { .. }
        )
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
