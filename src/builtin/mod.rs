//! Reference clustering algorithms registered by [`crate::AlgorithmRegistry::with_builtins`].

use crate::distance::{dissimilarity_from_columns, DistanceMetric};
use crate::{ClusterInput, InputType};
use num_traits::Float;
use std::borrow::Cow;

mod hierarchical;
mod pam;

pub(crate) use hierarchical::{hierarchical_01, hierarchical_k};
pub(crate) use pam::pam;

pub(crate) const PAM: &str = "pam";
pub(crate) const HIERARCHICAL_K: &str = "hierarchicalK";
pub(crate) const HIERARCHICAL_01: &str = "hierarchical01";

/// The pairwise dissimilarity between samples, computed from the columns of a data matrix
/// if needed.
fn dissimilarity_of<'a, T: Float>(
    input: &ClusterInput<'a, T>,
    metric: DistanceMetric,
) -> Cow<'a, [Vec<T>]> {
    match input.input_type() {
        InputType::Dissimilarity => Cow::Borrowed(input.matrix().values()),
        InputType::Data => Cow::Owned(dissimilarity_from_columns(input.matrix().values(), metric)),
    }
}
