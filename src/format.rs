//! Conversions between label vectors and partition lists, the minimum size filter and the
//! final output representation.

use crate::{ClusterError, LabelVector, PartitionList, UNCLUSTERED};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The representation of the final clustering.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Vector,
    List,
}

impl FromStr for OutputFormat {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vector" => Ok(OutputFormat::Vector),
            "list" => Ok(OutputFormat::List),
            other => Err(ClusterError::config(format!(
                "output format must be one of 'vector' or 'list', got '{other}'"
            ))),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Vector => write!(f, "vector"),
            OutputFormat::List => write!(f, "list"),
        }
    }
}

/// A final label vector, with the sample names of the input when it had any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedLabels {
    pub labels: LabelVector,
    pub names: Option<Vec<String>>,
}

impl NamedLabels {
    /// Pairs each label with its sample name, if names are present.
    pub fn named(&self) -> Option<impl Iterator<Item = (&str, i32)> + '_> {
        self.names
            .as_ref()
            .map(|names| names.iter().map(String::as_str).zip(self.labels.iter().copied()))
    }

    pub fn n_clusters(&self) -> usize {
        self.labels.iter().copied().max().unwrap_or(UNCLUSTERED).max(0) as usize
    }
}

/// The outcome of post-processing, in the requested output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clustering {
    Vector(NamedLabels),
    List(PartitionList),
}

impl Clustering {
    pub fn as_labels(&self) -> Option<&LabelVector> {
        match self {
            Clustering::Vector(named) => Some(&named.labels),
            Clustering::List(_) => None,
        }
    }

    pub fn as_partition(&self) -> Option<&PartitionList> {
        match self {
            Clustering::Vector(_) => None,
            Clustering::List(partition) => Some(partition),
        }
    }
}

/// Groups sample positions by label value, in ascending label order. Negative labels form
/// ordinary groups.
pub(crate) fn group_by_label(labels: &[i32]) -> Vec<(i32, Vec<usize>)> {
    let mut groups: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (sample, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(sample);
    }
    groups.into_iter().collect()
}

/// Converts a label vector into a partition list with one set per distinct label value.
///
/// No label is interpreted as "unclustered" here: every value, negative ones included, becomes
/// a set, ordered by ascending label.
pub fn labels_to_partition(labels: &[i32]) -> PartitionList {
    group_by_label(labels)
        .into_iter()
        .map(|(_label, members)| members)
        .collect()
}

/// Converts a partition list into a label vector of length `n_samples`: the set at position
/// `i` gets label `i + 1`, samples in no set get `-1`.
pub fn partition_to_labels(partition: &[Vec<usize>], n_samples: usize) -> LabelVector {
    let mut labels = vec![UNCLUSTERED; n_samples];
    for (position, members) in partition.iter().enumerate() {
        for &sample in members {
            labels[sample] = position as i32 + 1;
        }
    }
    labels
}

/// Keeps the sets with at least `min_size` members, preserving their order.
pub fn filter_min_size(partition: PartitionList, min_size: usize) -> PartitionList {
    partition
        .into_iter()
        .filter(|members| members.len() >= min_size)
        .collect()
}

/// Checks that a partition list holds disjoint, non-empty sets of positions below `n_samples`.
pub(crate) fn check_partition(partition: &[Vec<usize>], n_samples: usize) -> Result<(), String> {
    let mut seen = vec![false; n_samples];
    for (position, members) in partition.iter().enumerate() {
        if members.is_empty() {
            return Err(format!("set {position} is empty"));
        }
        for &sample in members {
            if sample >= n_samples {
                return Err(format!(
                    "set {position} contains sample {sample}, but there are only {n_samples} samples"
                ));
            }
            if seen[sample] {
                return Err(format!("sample {sample} appears in more than one set"));
            }
            seen[sample] = true;
        }
    }
    Ok(())
}
