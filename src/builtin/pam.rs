use super::dissimilarity_of;
use crate::{AlgorithmParams, ClusterError, ClusterInput, ClusterOutput};
use num_traits::Float;
use tracing::debug;

const MAX_SWAP_ITERATIONS: usize = 100;

/// Partitioning around medoids. Deterministic: BUILD picks medoids greedily, SWAP then applies
/// the single best improving medoid exchange until none is left. Labels are `1..=k`, numbered
/// by ascending medoid position.
pub(crate) fn pam<T: Float>(
    input: &ClusterInput<'_, T>,
    params: &AlgorithmParams,
    _labels_only: bool,
) -> Result<ClusterOutput, ClusterError> {
    let k_params = params.k_count()?;
    let k = k_params.require_k()?;
    let diss = dissimilarity_of(input, k_params.dist_metric());
    let n_samples = diss.len();
    if k > n_samples {
        return Err(ClusterError::config(format!(
            "cannot find {k} medoids among {n_samples} samples"
        )));
    }

    let mut medoids = build(&diss, k);
    let mut cost = total_cost(&diss, &medoids);
    for iteration in 0..MAX_SWAP_ITERATIONS {
        match best_swap(&diss, &medoids, cost) {
            Some((position, candidate, new_cost)) => {
                medoids[position] = candidate;
                cost = new_cost;
            }
            None => {
                debug!(iteration, k, "pam converged");
                break;
            }
        }
    }

    medoids.sort_unstable();
    let labels = (0..n_samples)
        .map(|i| nearest_medoid(&diss, &medoids, i) as i32 + 1)
        .collect();
    Ok(ClusterOutput::Labels(labels))
}

fn build<T: Float>(diss: &[Vec<T>], k: usize) -> Vec<usize> {
    let n_samples = diss.len();
    let mut medoids = Vec::with_capacity(k);
    // Distance from each sample to its closest medoid so far
    let mut nearest = vec![T::infinity(); n_samples];

    for _ in 0..k {
        let mut best: Option<(usize, T)> = None;
        for candidate in (0..n_samples).filter(|c| !medoids.contains(c)) {
            let cost = (0..n_samples)
                .map(|i| nearest[i].min(diss[i][candidate]))
                .fold(T::zero(), std::ops::Add::add);
            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((candidate, cost));
            }
        }
        if let Some((medoid, _)) = best {
            medoids.push(medoid);
            for (i, dist) in nearest.iter_mut().enumerate() {
                *dist = dist.min(diss[i][medoid]);
            }
        }
    }
    medoids
}

fn best_swap<T: Float>(diss: &[Vec<T>], medoids: &[usize], current: T) -> Option<(usize, usize, T)> {
    let mut best: Option<(usize, usize, T)> = None;
    let mut trial = medoids.to_vec();
    for position in 0..medoids.len() {
        for candidate in (0..diss.len()).filter(|c| !medoids.contains(c)) {
            trial[position] = candidate;
            let cost = total_cost(diss, &trial);
            let best_cost = best.map_or(current, |(_, _, cost)| cost);
            if cost < best_cost {
                best = Some((position, candidate, cost));
            }
        }
        trial[position] = medoids[position];
    }
    best
}

fn total_cost<T: Float>(diss: &[Vec<T>], medoids: &[usize]) -> T {
    (0..diss.len())
        .map(|i| diss[i][nearest_medoid(diss, medoids, i)])
        .fold(T::zero(), std::ops::Add::add)
}

/// Position in `medoids` of the medoid closest to sample `i`, ties to the earliest. A medoid
/// always belongs to itself, so coinciding medoids each keep a member.
fn nearest_medoid<T: Float>(diss: &[Vec<T>], medoids: &[usize], i: usize) -> usize {
    if let Some(own) = medoids.iter().position(|&medoid| medoid == i) {
        return own;
    }
    let mut nearest = 0;
    for (position, &medoid) in medoids.iter().enumerate().skip(1) {
        if diss[i][medoid] < diss[i][medoids[nearest]] {
            nearest = position;
        }
    }
    nearest
}
