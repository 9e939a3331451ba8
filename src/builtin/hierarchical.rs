use super::dissimilarity_of;
use crate::data_wrappers::MergeNode;
use crate::union_find::UnionFind;
use crate::{AlgorithmParams, ClusterError, ClusterInput, ClusterOutput, PartitionList};
use num_traits::Float;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// Average linkage tree cut into `k` clusters. Clusters are listed by their smallest member.
pub(crate) fn hierarchical_k<T: Float>(
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
            "cannot cut {n_samples} samples into {k} clusters"
        )));
    }
    let tree = average_linkage(&diss);
    // The first merge left out of the cut
    if let Some(node) = tree.get(n_samples - k) {
        debug!(k, height = node.distance.to_f64(), "cut average linkage tree");
    }
    Ok(ClusterOutput::Partition(cut_tree(&tree, n_samples, k)))
}

/// Walks an average linkage tree from the root and keeps the first node on each path whose
/// members are all within `alpha` of one another. Samples that never join such a node come out
/// as singletons.
pub(crate) fn hierarchical_01<T: Float>(
    input: &ClusterInput<'_, T>,
    params: &AlgorithmParams,
    _labels_only: bool,
) -> Result<ClusterOutput, ClusterError> {
    let alpha = params.threshold()?.alpha();
    if !input.is_dissimilarity() {
        return Err(ClusterError::config(
            "hierarchical01 requires a dissimilarity matrix",
        ));
    }
    let alpha = T::from(alpha)
        .ok_or_else(|| ClusterError::config("alpha cannot be represented in the input type"))?;
    let diss = input.matrix().values();
    let n_samples = diss.len();
    if n_samples == 0 {
        return Ok(ClusterOutput::Partition(Vec::new()));
    }

    let tree = average_linkage(diss);
    let root = 2 * n_samples - 2;
    let mut process_queue = VecDeque::from([root]);
    let mut clusters = Vec::new();

    while let Some(node_id) = process_queue.pop_front() {
        let members = leaves_of(&tree, n_samples, node_id);
        if node_id < n_samples || max_within(diss, &members) <= alpha {
            clusters.push(members);
            continue;
        }
        let node = &tree[node_id - n_samples];
        process_queue.push_back(node.left_child);
        process_queue.push_back(node.right_child);
    }
    Ok(ClusterOutput::Partition(clusters))
}

/// Agglomerates samples with average linkage using the Lance-Williams update. Ties between
/// pairs go to the pair found first in row major order.
pub(crate) fn average_linkage<T: Float>(diss: &[Vec<T>]) -> Vec<MergeNode<T>> {
    let n_samples = diss.len();
    let mut tree = Vec::with_capacity(n_samples.saturating_sub(1));
    let mut dist: Vec<Vec<T>> = diss.to_vec();
    let mut active = vec![true; n_samples];
    let mut slot_node: Vec<usize> = (0..n_samples).collect();
    let mut union_find = UnionFind::new(n_samples);

    for _ in 1..n_samples {
        let mut closest: Option<(usize, usize, T)> = None;
        for i in (0..n_samples).filter(|&i| active[i]) {
            for j in ((i + 1)..n_samples).filter(|&j| active[j]) {
                if closest.map_or(true, |(_, _, d)| dist[i][j] < d) {
                    closest = Some((i, j, dist[i][j]));
                }
            }
        }
        let Some((i, j, distance)) = closest else {
            break;
        };

        let (left_child, right_child) = (slot_node[i], slot_node[j]);
        let size_i = T::from(union_find.size_of(left_child)).unwrap_or_else(T::one);
        let size_j = T::from(union_find.size_of(right_child)).unwrap_or_else(T::one);
        for l in (0..n_samples).filter(|&l| active[l] && l != i && l != j) {
            let merged = (size_i * dist[i][l] + size_j * dist[j][l]) / (size_i + size_j);
            dist[i][l] = merged;
            dist[l][i] = merged;
        }
        active[j] = false;

        let node_id = union_find.union(left_child, right_child);
        slot_node[i] = node_id;
        tree.push(MergeNode {
            left_child,
            right_child,
            distance,
            size: union_find.size_of(node_id),
        });
    }
    tree
}

/// Replays the first `n_samples - k` merges and groups samples by the node they end up in.
pub(crate) fn cut_tree<T>(tree: &[MergeNode<T>], n_samples: usize, k: usize) -> PartitionList {
    let mut union_find = UnionFind::new(n_samples);
    for node in tree.iter().take(n_samples.saturating_sub(k)) {
        union_find.union(node.left_child, node.right_child);
    }

    let mut first_member_of_root: BTreeMap<usize, usize> = BTreeMap::new();
    let mut clusters: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for sample in 0..n_samples {
        let root = union_find.find(sample);
        let first = *first_member_of_root.entry(root).or_insert(sample);
        clusters.entry(first).or_default().push(sample);
    }
    clusters.into_values().collect()
}

fn leaves_of<T>(tree: &[MergeNode<T>], n_samples: usize, node_id: usize) -> Vec<usize> {
    let capacity = node_id.checked_sub(n_samples).map_or(1, |merge| tree[merge].size);
    let mut process_queue = VecDeque::from([node_id]);
    let mut leaves = Vec::with_capacity(capacity);
    while let Some(current) = process_queue.pop_front() {
        if current < n_samples {
            leaves.push(current);
            continue;
        }
        let node = &tree[current - n_samples];
        process_queue.push_back(node.left_child);
        process_queue.push_back(node.right_child);
    }
    leaves.sort_unstable();
    leaves
}

fn max_within<T: Float>(diss: &[Vec<T>], members: &[usize]) -> T {
    let mut max = T::zero();
    for (n, &i) in members.iter().enumerate() {
        for &j in &members[n + 1..] {
            max = max.max(diss[i][j]);
        }
    }
    max
}
