use crate::{ClusterError, UNCLUSTERED};
use num_traits::Float;
use std::collections::{BTreeMap, BTreeSet};

/// Silhouette width per sample, in `[-1, 1]`. `NaN` marks an undefined width and `-inf` a
/// sample excluded from its cluster.
pub type SilhouetteScores<T> = Vec<T>;

/// Computes the silhouette width of every sample against a dissimilarity matrix.
///
/// Every distinct label, negative ones included, is treated as a cluster. Samples alone in
/// their cluster have width 0. When there are fewer than two clusters no width is defined and
/// every entry is `NaN`.
///
/// # Parameters
/// * `diss` - a square N x N dissimilarity matrix.
/// * `labels` - a label per sample, of length N.
///
/// # Returns
/// * The N silhouette widths, or a `ClusterError::WrongDimension` if `diss` is not N x N.
pub fn silhouette_widths<T: Float>(
    diss: &[Vec<T>],
    labels: &[i32],
) -> Result<SilhouetteScores<T>, ClusterError> {
    check_dimensions(diss, labels)?;
    Ok(widths_of(diss, labels, None))
}

/// Like [`silhouette_widths`], but samples labelled `-1` are unclustered: they belong to no
/// cluster, take no part in anyone's width and get width `NaN` themselves.
pub(crate) fn clustered_silhouette_widths<T: Float>(
    diss: &[Vec<T>],
    labels: &[i32],
) -> Result<SilhouetteScores<T>, ClusterError> {
    check_dimensions(diss, labels)?;
    Ok(widths_of(diss, labels, Some(UNCLUSTERED)))
}

fn check_dimensions<T>(diss: &[Vec<T>], labels: &[i32]) -> Result<(), ClusterError> {
    let n_samples = labels.len();
    if diss.len() != n_samples || diss.iter().any(|row| row.len() != n_samples) {
        return Err(ClusterError::WrongDimension(format!(
            "silhouette widths of {n_samples} labels need a {n_samples} x {n_samples} dissimilarity"
        )));
    }
    Ok(())
}

fn widths_of<T: Float>(diss: &[Vec<T>], labels: &[i32], skip: Option<i32>) -> SilhouetteScores<T> {
    let cluster_index: BTreeMap<i32, usize> = labels
        .iter()
        .copied()
        .filter(|&label| Some(label) != skip)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(index, label)| (label, index))
        .collect();
    let n_clusters = cluster_index.len();
    if n_clusters < 2 {
        return vec![T::nan(); labels.len()];
    }

    let membership: Vec<Option<usize>> = labels
        .iter()
        .map(|label| cluster_index.get(label).copied())
        .collect();
    let mut cluster_sizes = vec![0_usize; n_clusters];
    for &cluster in membership.iter().flatten() {
        cluster_sizes[cluster] += 1;
    }

    let mut widths = Vec::with_capacity(labels.len());
    let mut sums = vec![T::zero(); n_clusters];
    for (i, own) in membership.iter().enumerate() {
        let Some(own) = *own else {
            widths.push(T::nan());
            continue;
        };
        if cluster_sizes[own] == 1 {
            widths.push(T::zero());
            continue;
        }
        sums.iter_mut().for_each(|sum| *sum = T::zero());
        for (j, other) in membership.iter().enumerate() {
            if let Some(other) = *other {
                if i != j {
                    sums[other] = sums[other] + diss[i][j];
                }
            }
        }
        let a = sums[own] / T::from(cluster_sizes[own] - 1).unwrap_or_else(T::one);
        let b = (0..n_clusters)
            .filter(|&cluster| cluster != own)
            .map(|cluster| sums[cluster] / T::from(cluster_sizes[cluster]).unwrap_or_else(T::one))
            .fold(T::infinity(), T::min);
        let max = a.max(b);
        widths.push(if max > T::zero() { (b - a) / max } else { T::zero() });
    }
    widths
}

/// Mean over all widths. `NaN` if any width is undefined or there are none.
pub fn mean_width<T: Float>(widths: &[T]) -> T {
    if widths.is_empty() {
        return T::nan();
    }
    let sum = widths.iter().fold(T::zero(), |sum, &w| sum + w);
    sum / T::from(widths.len()).unwrap_or_else(T::one)
}

/// Mean of the widths of the given members, skipping undefined (`NaN`) widths. `NaN` if no
/// member has a defined width.
pub(crate) fn mean_defined_width<T: Float>(widths: &[T], members: &[usize]) -> T {
    let (sum, count) = members
        .iter()
        .map(|&i| widths[i])
        .filter(|w| !w.is_nan())
        .fold((T::zero(), 0_usize), |(sum, count), w| (sum + w, count + 1));
    if count == 0 {
        T::nan()
    } else {
        sum / T::from(count).unwrap_or_else(T::one)
    }
}
