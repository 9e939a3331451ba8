//! Post-processing for pluggable clustering algorithms in Rust. Generic over floating point
//! numeric types.
//!
//! A clustering algorithm is treated as a black box that maps a data matrix or a dissimilarity
//! matrix to either a label per sample or a list of sample sets. This crate turns that raw
//! output into a final, validated partition:
//!  1. For algorithms that target a number of clusters K, it can search a range of K for the
//!     clustering with the highest mean silhouette width, and can mark samples whose own
//!     silhouette width does not exceed a cutoff as unclustered;
//!  2. Clusters smaller than a minimum size are dropped, their samples become unclustered; and
//!  3. The surviving clusters are ordered deterministically (by size, or by mean silhouette
//!     width during K selection) and returned as a label vector, with `-1` for unclustered
//!     samples, or as a list of disjoint index sets.
//!
//! Ties in the K search always go to the candidate tried first, whether candidates are
//! evaluated in sequence or, with the `parallel` feature, on the rayon thread pool.
//!
//! # Examples
//! ```
//!use clusterpost::{
//!    AlgorithmParams, AlgorithmRegistry, ClusterInput, KParams, LabeledMatrix, OrderBy,
//!    OutputFormat, PostProcessConfig, PostProcessor,
//!};
//!
//!let positions = [0.0, 0.1, 0.2, 10.0, 10.1, 10.2];
//!let diss = LabeledMatrix::new(
//!    positions
//!        .iter()
//!        .map(|a: &f64| positions.iter().map(|b| (a - b).abs()).collect())
//!        .collect(),
//!);
//!let registry = AlgorithmRegistry::with_builtins();
//!let pam = registry.get("pam").unwrap();
//!let config = PostProcessConfig::builder().find_best_k(true).k_range([2, 3, 4]).build();
//!let clustering = PostProcessor::new(pam, ClusterInput::dissimilarity(&diss), AlgorithmParams::KCount(KParams::without_k()))
//!    .config(config)
//!    .order_by(OrderBy::Size)
//!    .output_format(OutputFormat::List)
//!    .run()
//!    .unwrap();
//!assert_eq!(clustering.as_partition().unwrap(), &vec![vec![0, 1, 2], vec![3, 4, 5]]);
//! ```
//!
//! # References
//! * [Rousseeuw, P.J. Silhouettes: a graphical aid to the interpretation and validation of cluster analysis.](https://doi.org/10.1016/0377-0427(87)90125-7)
//! * [Kaufman, L.; Rousseeuw, P.J. Partitioning Around Medoids (Program PAM).](https://doi.org/10.1002/9780470316801.ch2)

pub use crate::algorithm::{
    AlgorithmCategory, AlgorithmParams, AlgorithmRegistry, AlgorithmSpec, ClusterFn,
    ClusterOutput, KParams, OutputShape, ThresholdParams,
};
pub use crate::cancel::CancellationToken;
pub use crate::config::{PostProcessConfig, PostProcessConfigBuilder};
pub use crate::data_wrappers::{
    ClusterInput, InputType, LabelVector, LabeledMatrix, PartitionList, UNCLUSTERED,
};
pub use crate::distance::{dissimilarity_from_columns, DistanceMetric};
pub use crate::error::ClusterError;
pub use crate::format::{
    filter_min_size, labels_to_partition, partition_to_labels, Clustering, NamedLabels,
    OutputFormat,
};
pub use crate::invoker::ClusterInvoker;
pub use crate::k_selection::{CandidateScore, KSearch, KSelector};
pub use crate::order::{order_by_size, OrderBy};
pub use crate::pipeline::{ChainedClustering, PostProcessor};
pub use crate::silhouette::{mean_width, silhouette_widths, SilhouetteScores};

mod algorithm;
mod builtin;
mod cancel;
mod config;
mod data_wrappers;
mod distance;
mod error;
mod format;
mod invoker;
mod k_selection;
mod order;
mod pipeline;
mod silhouette;
mod union_find;
mod validation;
