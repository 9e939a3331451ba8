use crate::silhouette::mean_defined_width;
use crate::{ClusterError, PartitionList};
use num_traits::Float;
use std::cmp::Ordering;
use std::str::FromStr;

/// How surviving clusters are ordered before labels are assigned.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OrderBy {
    /// Descending cluster size, ties kept in arrival order.
    #[default]
    Size,
    /// Descending mean silhouette width. Only applied while selecting K, elsewhere the order is
    /// left unchanged.
    Best,
}

impl FromStr for OrderBy {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "size" => Ok(OrderBy::Size),
            "best" => Ok(OrderBy::Best),
            other => Err(ClusterError::config(format!(
                "orderBy must be one of 'size' or 'best', got '{other}'"
            ))),
        }
    }
}

/// Stable sort of the sets by descending cardinality.
pub fn order_by_size(mut partition: PartitionList) -> PartitionList {
    partition.sort_by(|a, b| b.len().cmp(&a.len()));
    partition
}

/// Stable sort of labelled groups by descending mean silhouette width of their members.
/// Undefined widths are left out of each mean; a group with no defined width sorts last.
pub(crate) fn order_by_silhouette<T: Float>(
    groups: Vec<(i32, Vec<usize>)>,
    widths: &[T],
) -> Vec<(i32, Vec<usize>)> {
    let mut keyed: Vec<(T, (i32, Vec<usize>))> = groups
        .into_iter()
        .map(|group| (mean_defined_width(widths, &group.1), group))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| descending_nan_last(*a, *b));
    keyed.into_iter().map(|(_, group)| group).collect()
}

fn descending_nan_last<T: Float>(a: T, b: T) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
