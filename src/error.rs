use thiserror::Error;

/// Possible errors that arise while invoking a clustering algorithm or post-processing its
/// output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("No clustering algorithm registered under the name '{0}'")]
    NotFound(String),

    #[error("The dataset provided is empty")]
    EmptyDataset,

    #[error("Input matrix has mismatched dimensions: {0}")]
    WrongDimension(String),

    #[error("Non finite value: {0}")]
    NonFiniteValue(String),

    #[error("Not a valid dissimilarity matrix: {0}")]
    InvalidDissimilarity(String),

    #[error("Clustering algorithm failed: {0}")]
    AlgorithmFailure(String),

    #[error("Clustering was cancelled before completion")]
    Cancelled,
}

impl ClusterError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        ClusterError::Configuration(msg.into())
    }
}
